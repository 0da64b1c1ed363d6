pub mod extraction;
pub mod processor; // recognize → sanitize → normalize → extract
