//! Gen 3 (Ruby/Sapphire/Emerald/FireRed/LeafGreen) pk3 files.

pub mod charset;
pub mod exporter;
pub mod importer;
pub mod layout;
pub mod pid;
