pub mod bos_choch;
pub mod fvg;
pub mod liquidity;
pub mod sweep;
pub mod swings;
pub mod volume_footprint;
pub mod wick;

pub use bos_choch::{detect_bos_choch, BosChoch};
pub use fvg::{detect_fvg, FairValueGap};
pub use liquidity::{detect_equal_levels, EqualLevelCluster};
pub use sweep::{detect_and_validate_sweep, Sweep};
pub use swings::{detect_swings, label_swings, LabeledSwing, Swing, SwingKind, SwingLabel};
pub use volume_footprint::{rolling_volume_footprint, VolumeFootprint};
pub use wick::wick_asymmetry;
