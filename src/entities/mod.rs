pub mod mirror_entry;

pub use mirror_entry::Entity as MirrorEntry;
