pub mod ease;
pub mod float_anim;
