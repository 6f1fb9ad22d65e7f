mod guard;
mod iter;
mod vec;

pub use iter::IntoIter;
pub use vec::DynamicArray;
