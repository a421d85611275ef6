// ホステル予約システム Hostel Khojau
// ドメイン層・アプリケーション層・アダプター層のヘキサゴナル構成

pub mod adapter;
pub mod application;
pub mod domain;
