//! Hand-written mapping between stored records and the JSON shapes exposed
//! over HTTP. Each serializer lists its fields and validation rules
//! explicitly.

pub mod errors;
pub mod fields;
pub mod ingredient;
pub mod recipe;
