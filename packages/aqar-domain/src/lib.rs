pub mod blend;
pub mod buckets;
pub mod cursor;
pub mod document;
pub mod filters;
pub mod profile;
pub mod query;
pub mod vocab;
