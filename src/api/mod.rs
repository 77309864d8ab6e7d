pub mod decode;
pub mod encode;
pub mod image;

pub use decode::{handle_decode, DecodeRequest, DecodeResponse, __path_handle_decode};
pub use encode::{handle_encode, EncodeRequest, EncodeResponse, UploadedFile, __path_handle_encode};
pub use image::{handle_image, handle_image_download, __path_handle_image, __path_handle_image_download};
