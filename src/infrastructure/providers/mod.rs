pub mod wechat;

pub use wechat::WechatIdentityProvider;
