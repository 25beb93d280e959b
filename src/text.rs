pub mod fonts;
pub mod markup;
pub mod runs;
