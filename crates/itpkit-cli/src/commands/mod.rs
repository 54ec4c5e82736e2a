pub mod inspect;
pub mod trim;
