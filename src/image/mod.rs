pub mod meta;
pub mod plane;
pub mod traits;


pub use self::meta::ImageMeta;
pub use self::plane::{validate_plane_set, CompressionMode, PlaneImage};
pub use self::traits::{ImageView, ImageViewMut, Rows};
