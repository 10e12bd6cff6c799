//! Schema id derivation.

use crate::types::TypeHandle;

/// Default schema id for a type.
///
/// Plain types use their simple name with `[]` spelled `Array`. Constructed
/// generics prefix the ids of their arguments to the generic name, so
/// `Pair<Int32, String>` becomes `Int32StringPair`.
#[must_use]
pub fn default_schema_id(ty: TypeHandle<'_>) -> String {
    let descriptor = ty.descriptor();
    if descriptor.generic_args.is_empty() {
        return descriptor.name.replace("[]", "Array");
    }

    let mut id: String = ty.generic_args().map(default_schema_id).collect();
    id.push_str(descriptor.base_name());
    id
}
