pub mod item;

pub use item::{CreateItem, ImageUpload, Item, ItemForm};
