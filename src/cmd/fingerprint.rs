use anyhow::Result;

use anisrc::{random_profile, FingerprintOptions};

use super::output::print_json;

pub fn cmd_fingerprint(count: usize, options: &FingerprintOptions, json: bool) -> Result<()> {
    let profiles: Vec<_> = (0..count).map(|_| random_profile(options)).collect();
    if json {
        return print_json(&profiles);
    }

    println!("🎭 Generating {count} browser fingerprints:\n");
    for (i, profile) in profiles.iter().enumerate() {
        println!("Profile {}:", i + 1);
        println!("   UA: {}", profile.user_agent);
        println!("   Accept-Language: {}", profile.accept_language);
        if !profile.sec_ch_ua.is_empty() {
            println!("   Sec-CH-UA: {}", profile.sec_ch_ua);
            println!("   Sec-CH-UA-Platform: {}", profile.sec_ch_ua_platform);
        }
        println!();
    }
    Ok(())
}
