pub mod html;
pub mod lofi;
pub mod radion;
pub mod shelter;

pub use lofi::LofiScraper;
pub use radion::RadionScraper;
pub use shelter::ShelterScraper;
