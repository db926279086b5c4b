pub mod detect;
pub mod manual;
pub mod normalize;
pub mod synthesize;
pub mod tcx;
pub mod trim;
pub mod validate;
