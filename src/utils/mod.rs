pub mod feature_flags;
pub mod shell;
pub mod suggest;
pub mod text;
