pub(crate) mod completeness;
pub(crate) mod domains;
pub(crate) mod monotonicity;
