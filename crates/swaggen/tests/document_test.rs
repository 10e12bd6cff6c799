use serde_json::{Value, json};
use swaggen::description::{BindingSource, EndpointMetadata, ParameterDescription, ResponseType};
use swaggen::openapi::{Info, Server};
use swaggen::route::HttpMethod;
use swaggen::types::{EnumDescriptor, PrimitiveType, PropertyDescriptor};
use swaggen::{
    ApiDescriptions, GeneratorOptions, RouteDescription, SchemaGeneratorOptions, SwaggerGenerator,
    TypeCatalog, TypeDescriptor,
};

fn v1() -> GeneratorOptions {
    GeneratorOptions::default().swagger_doc("v1", Info::new("Test API", "V1"))
}

fn product_api() -> ApiDescriptions {
    let mut types = TypeCatalog::new();
    let int = types.primitive(PrimitiveType::Int32);
    let string = types.primitive(PrimitiveType::String);
    let product = types.register(
        TypeDescriptor::object("Product")
            .in_namespace("Api.Models")
            .with_property(PropertyDescriptor::new("Id", int).required())
            .with_property(PropertyDescriptor::new("Name", string)),
    );

    let routes = vec![
        RouteDescription::new("GET", "products/{id:int}")
            .with_action("Api.Products.Get")
            .with_controller("Products")
            .with_metadata(EndpointMetadata {
                endpoint_name: Some("GetProduct".to_string()),
                ..EndpointMetadata::default()
            })
            .with_parameter(
                ParameterDescription::new("id")
                    .from_source(BindingSource::Path)
                    .typed(int),
            )
            .with_response(ResponseType::new(200).typed(product))
            .with_response(ResponseType::new(404)),
        RouteDescription::new("POST", "products")
            .with_action("Api.Products.Create")
            .with_controller("Products")
            .with_parameter(
                ParameterDescription::new("product")
                    .from_source(BindingSource::Body)
                    .typed(product)
                    .required(),
            )
            .with_response(ResponseType::new(201).typed(product)),
    ];
    ApiDescriptions::new(types, routes)
}

/// Every `$ref` in `value`
fn references(value: &Value, found: &mut Vec<String>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                match (key.as_str(), child) {
                    ("$ref", Value::String(reference)) => found.push(reference.clone()),
                    _ => references(child, found),
                }
            }
        }
        Value::Array(items) => items.iter().for_each(|item| references(item, found)),
        _ => {}
    }
}

#[test]
fn product_document() {
    let generator = SwaggerGenerator::new(v1(), product_api());

    let document = generator.get_document("v1").unwrap();

    insta::assert_json_snapshot!(document, @r##"
    {
      "openapi": "3.0.3",
      "info": {
        "title": "Test API",
        "version": "V1"
      },
      "paths": {
        "/products/{id}": {
          "get": {
            "tags": [
              "Products"
            ],
            "operationId": "GetProduct",
            "parameters": [
              {
                "name": "id",
                "in": "path",
                "required": true,
                "schema": {
                  "type": "integer",
                  "format": "int32"
                }
              }
            ],
            "responses": {
              "200": {
                "description": "OK",
                "content": {
                  "application/json": {
                    "schema": {
                      "$ref": "#/components/schemas/Product"
                    }
                  }
                }
              },
              "404": {
                "description": "Not Found"
              }
            }
          }
        },
        "/products": {
          "post": {
            "tags": [
              "Products"
            ],
            "requestBody": {
              "required": true,
              "content": {
                "application/json": {
                  "schema": {
                    "$ref": "#/components/schemas/Product"
                  }
                }
              }
            },
            "responses": {
              "201": {
                "description": "Created",
                "content": {
                  "application/json": {
                    "schema": {
                      "$ref": "#/components/schemas/Product"
                    }
                  }
                }
              }
            }
          }
        }
      },
      "components": {
        "schemas": {
          "Product": {
            "type": "object",
            "properties": {
              "Id": {
                "type": "integer",
                "format": "int32"
              },
              "Name": {
                "type": "string",
                "nullable": true
              }
            },
            "required": [
              "Id"
            ]
          }
        }
      },
      "tags": [
        {
          "name": "Products"
        }
      ]
    }
    "##);
}

#[test]
fn generation_is_idempotent() {
    let generator = SwaggerGenerator::new(v1(), product_api());

    let first = serde_json::to_value(generator.get_document("v1").unwrap()).unwrap();
    let second = serde_json::to_value(generator.get_document("v1").unwrap()).unwrap();

    assert_eq!(first, second);
}

#[test]
fn every_reference_resolves_to_a_component() {
    let mut types = TypeCatalog::new();
    let string = types.primitive(PrimitiveType::String);
    let node = types.register(TypeDescriptor::object("Node"));
    let children = types.array(node);
    types
        .get_mut(node)
        .properties
        .extend([
            PropertyDescriptor::new("Label", string),
            PropertyDescriptor::new("Children", children),
        ]);
    let status = types.register(TypeDescriptor::enumeration(
        "Status",
        EnumDescriptor::strings(["Active", "Retired"]),
    ));
    let routes = vec![
        RouteDescription::new("GET", "tree")
            .with_parameter(ParameterDescription::new("status").typed(status))
            .with_response(ResponseType::new(200).typed(node)),
    ];
    let generator = SwaggerGenerator::new(v1(), ApiDescriptions::new(types, routes));

    let document = serde_json::to_value(generator.get_document("v1").unwrap()).unwrap();

    let mut found = Vec::new();
    references(&document, &mut found);
    assert!(!found.is_empty());
    for reference in found {
        let schema_id = reference.strip_prefix("#/components/schemas/").unwrap();
        assert!(
            document["components"]["schemas"].get(schema_id).is_some(),
            "dangling reference {reference}"
        );
    }
    assert_eq!(
        document["components"]["schemas"]["Node"]["properties"]["Children"]["items"],
        json!({ "$ref": "#/components/schemas/Node" })
    );
}

#[test]
fn documents_only_contain_their_group() {
    let routes = vec![
        RouteDescription::new("GET", "shared"),
        RouteDescription::new("GET", "v1-only").in_group("v1"),
        RouteDescription::new("GET", "v2-only").in_group("v2"),
    ];
    let options = v1().swagger_doc("v2", Info::new("Test API", "V2"));
    let generator =
        SwaggerGenerator::new(options, ApiDescriptions::new(TypeCatalog::new(), routes));

    let v1 = generator.get_document("v1").unwrap();
    let v2 = generator.get_document("v2").unwrap();

    assert_eq!(v1.paths.keys().collect::<Vec<_>>(), vec!["/shared", "/v1-only"]);
    assert_eq!(v2.paths.keys().collect::<Vec<_>>(), vec!["/shared", "/v2-only"]);
    assert_eq!(v2.info.version, "V2");
}

#[test]
fn unknown_document_is_rejected() {
    let options = v1().swagger_doc("v2", Info::new("Test API", "V2"));
    let generator = SwaggerGenerator::new(options, product_api());

    let err = generator.get_document("v3").unwrap_err();

    assert_eq!(
        err.to_string(),
        r#"Unknown Swagger document - "v3". Known Swagger documents: "v1","v2""#
    );
}

#[test]
fn conflicting_actions_fail_without_resolver() {
    let routes = vec![
        RouteDescription::new("POST", "collection").with_action("Api.Collection.Create"),
        RouteDescription::new("POST", "collection").with_action("Api.Collection.Import"),
    ];
    let api = || ApiDescriptions::new(TypeCatalog::new(), routes.clone());

    let err = SwaggerGenerator::new(v1(), api()).get_document("v1").unwrap_err();
    assert_eq!(
        err.to_string(),
        "Conflicting method/path combination \"POST collection\" for actions - Api.Collection.Create, Api.Collection.Import. Actions require a unique method/path combination for Swagger/OpenAPI 2.0 and 3.0. Use a conflicting actions resolver as a workaround."
    );

    let options = v1().resolve_conflicting_actions(|candidates| candidates[1].clone());
    let document = SwaggerGenerator::new(options, api()).get_document("v1").unwrap();
    let operation = document.paths["/collection"].get_operation(&HttpMethod::Post);
    assert!(operation.is_some());
}

#[test]
fn parameters_are_described_in_camel_case() {
    let mut types = TypeCatalog::new();
    let int = types.primitive(PrimitiveType::Int32);
    let routes = vec![
        RouteDescription::new("GET", "items/{ItemId}")
            .with_parameter(
                ParameterDescription::new("ItemId")
                    .from_source(BindingSource::Path)
                    .typed(int),
            )
            .with_parameter(
                ParameterDescription::new("PageSize")
                    .from_source(BindingSource::Query)
                    .typed(int),
            )
            .with_parameter(
                ParameterDescription::new("X-Trace")
                    .from_source(BindingSource::Header),
            ),
    ];
    let options = v1().describe_all_parameters_in_camel_case();
    let generator = SwaggerGenerator::new(options, ApiDescriptions::new(types, routes));

    let document = generator.get_document("v1").unwrap();

    let operation = document.paths["/items/{ItemId}"].get_operation(&HttpMethod::Get).unwrap();
    let names: Vec<_> = operation.parameters.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["itemId", "pageSize", "x-Trace"]);
}

#[test]
fn form_parameters_become_multipart_body() {
    let mut types = TypeCatalog::new();
    let string = types.primitive(PrimitiveType::String);
    let file = types.file();
    let routes = vec![
        RouteDescription::new("POST", "files")
            .with_parameter(
                ParameterDescription::new("param1")
                    .from_source(BindingSource::Form)
                    .typed(string)
                    .required(),
            )
            .with_parameter(
                ParameterDescription::new("param2")
                    .from_source(BindingSource::Form)
                    .typed(file),
            )
            .with_response(ResponseType::new(200)),
    ];
    let generator = SwaggerGenerator::new(v1(), ApiDescriptions::new(types, routes));

    let document = generator.get_document("v1").unwrap();

    let operation = document.paths["/files"].get_operation(&HttpMethod::Post).unwrap();
    insta::assert_json_snapshot!(operation.request_body, @r#"
    {
      "content": {
        "multipart/form-data": {
          "schema": {
            "type": "object",
            "properties": {
              "param1": {
                "type": "string"
              },
              "param2": {
                "type": "string",
                "format": "binary"
              }
            },
            "required": [
              "param1"
            ]
          },
          "encoding": {
            "param1": {
              "style": "form"
            },
            "param2": {
              "style": "form"
            }
          }
        }
      }
    }
    "#);
}

#[test]
fn servers_and_settings_flow_into_document() {
    let options = v1()
        .add_server(Server::new("https://api.example.com"))
        .schema_generator(SchemaGeneratorOptions::default().use_inline_definitions_for_enums());
    let mut types = TypeCatalog::new();
    let color = types.register(TypeDescriptor::enumeration(
        "Color",
        EnumDescriptor::strings(["Red", "Green"]),
    ));
    let routes = vec![
        RouteDescription::new("GET", "colors").with_response(ResponseType::new(200).typed(color)),
    ];
    let generator = SwaggerGenerator::new(options, ApiDescriptions::new(types, routes));

    let document = serde_json::to_value(generator.get_document("v1").unwrap()).unwrap();

    assert_eq!(document["servers"], json!([{ "url": "https://api.example.com" }]));
    let response = &document["paths"]["/colors"]["get"]["responses"]["200"];
    assert_eq!(
        response["content"]["application/json"]["schema"],
        json!({ "type": "string", "enum": ["Red", "Green"] })
    );
    assert!(document.get("components").is_none());
}
