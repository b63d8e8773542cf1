pub mod detail;
pub mod fingerprint;
pub mod home;
pub mod otakudesu;
pub mod output;
pub mod samehadaku;

pub use detail::cmd_detail;
pub use fingerprint::cmd_fingerprint;
pub use home::cmd_home;
pub use otakudesu::{cmd_otakudesu, OtakudesuCommand};
pub use samehadaku::{cmd_samehadaku, SamehadakuCommand};
