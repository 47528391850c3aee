pub mod fstab;
pub mod inspect;
