/// Ad networks recognised without any fetched list.
///
/// Matched as substrings of the hostname, so `static.doubleclick.net` and
/// `ad.doubleclick.net` both hit `doubleclick.net`.
pub const BUILTIN_AD_DOMAINS: &[&str] = &[
    "doubleclick.net",
    "googleadservices.com",
    "googlesyndication.com",
    "adnxs.com",
    "advertising.com",
    "adform.net",
    "criteo.com",
    "outbrain.com",
    "taboola.com",
    "adroll.com",
    "amazon-adsystem.com",
    "gcdn.2mdn.net",
    "bimg.abv.bg",
];
