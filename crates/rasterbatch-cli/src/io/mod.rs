//! Folder loading and saving of transformed images.

mod load;
mod save;

pub use load::{check_folder, is_image_name, load_folder, load_image, LoadError, LoadedFolder, IMAGE_EXTENSIONS};
pub use save::{output_name, prepare_output_dir, save_batch, save_image, SaveError, OUTPUT_PREFIX};
