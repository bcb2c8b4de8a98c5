use rand::RngExt;

const FIREFOX_VERSIONS: [&str; 20] = [
    "133.0", "132.0", "131.0", "130.0", "129.0", "128.0", "127.0", "126.0", "125.0", "124.0",
    "123.0", "122.0", "121.0", "120.0", "119.0", "118.0", "117.0", "116.0", "115.0", "114.0",
];

const CHROME_VERSIONS: [&str; 20] = [
    "133.0.6943.50", "133.0.6943.88", "132.0.6834.83", "132.0.6834.110",
    "131.0.6778.85", "131.0.6778.108", "130.0.6723.92", "130.0.6723.117",
    "129.0.6668.70", "129.0.6668.89", "128.0.6613.120", "128.0.6613.138",
    "127.0.6533.88", "127.0.6533.119", "126.0.6478.126", "126.0.6478.182",
    "125.0.6422.141", "125.0.6422.176", "124.0.6367.201", "124.0.6367.243",
];

const OS_STRINGS: [&str; 12] = [
    "Windows NT 10.0; Win64; x64",
    "Windows NT 10.0; Win64; x64",
    "Windows NT 10.0; Win64; x64",
    "Windows NT 10.0; WOW64",
    "Macintosh; Intel Mac OS X 10_15_7",
    "Macintosh; Intel Mac OS X 13_6_9",
    "Macintosh; Intel Mac OS X 14_7_2",
    "Macintosh; Apple Silicon Mac OS X 14_7_2",
    "X11; Linux x86_64",
    "X11; Linux x86_64",
    "X11; Ubuntu; Linux x86_64",
    "X11; Fedora; Linux x86_64",
];

fn gen_firefox_ua() -> String {
    let mut rng = rand::rng();
    let version = FIREFOX_VERSIONS[rng.random_range(0..FIREFOX_VERSIONS.len())];
    let os = OS_STRINGS[rng.random_range(0..OS_STRINGS.len())];

    format!(
        "Mozilla/5.0 ({}; rv:{}) Gecko/20100101 Firefox/{}",
        os, version, version
    )
}

fn gen_chrome_ua() -> String {
    let mut rng = rand::rng();
    let version = CHROME_VERSIONS[rng.random_range(0..CHROME_VERSIONS.len())];
    let os = OS_STRINGS[rng.random_range(0..OS_STRINGS.len())];

    format!(
        "Mozilla/5.0 ({}) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/{} Safari/537.36",
        os, version
    )
}

pub fn gen_random_ua() -> String {
    let mut rng = rand::rng();
    match rng.random_range(0..4) {
        0..=2 => gen_chrome_ua(),
        _ => gen_firefox_ua(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ua_formats() {
        for _ in 0..100 {
            let ua = gen_random_ua();
            assert!(
                ua.starts_with("Mozilla/5.0"),
                "UA should start with Mozilla/5.0: {}",
                ua
            );
            assert!(ua.len() > 50, "UA should be reasonably long: {}", ua);
        }
    }
}
