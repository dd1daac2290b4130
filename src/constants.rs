/// API key seeded for the initial `admin` user. Rotate it after first login.
pub const DEFAULT_API_KEY: &str = "keyword_suggest_default_api_key_please_regenerate";

pub const DEFAULT_ADMIN_USERNAME: &str = "admin";

pub mod limits {

    pub const DEFAULT_PAGE_LIMIT: u64 = 100;

    pub const MAX_PAGE_LIMIT: u64 = 1000;

    pub const MAX_KEYWORD_LENGTH: usize = 100;

    pub const MAX_CRAWL_TEXT_CHARS: usize = 2000;
}

pub mod facility {

    pub const MAX_NAME: usize = 100;

    pub const MAX_BUSINESS_TYPE: usize = 50;

    pub const MAX_ADDRESS: usize = 200;

    pub const MAX_PHONE: usize = 20;

    pub const MAX_BUSINESS_HOURS: usize = 200;

    pub const MAX_CLOSED_DAYS: usize = 100;

    pub const MAX_URL: usize = 255;

    pub const MAX_ADDITIONAL_INFO: usize = 1000;
}

pub mod export {

    pub const CSV_HEADER: [&str; 5] = ["施設名", "業種", "住所", "カテゴリ", "キーワード"];
}
