pub mod animation;
pub mod fit;
pub mod font_assets;
pub mod highlight;
pub mod manifest;
pub mod page;
pub mod scene;
pub mod schema;
pub mod templates;
