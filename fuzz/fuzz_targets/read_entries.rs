#![no_main]

use libfuzzer_sys::fuzz_target;
use libslipit::{Compression, ProviderType};
use std::io::Cursor;

fuzz_target!(|data: &[u8]| {
    for provider in [
        ProviderType::Tar,
        ProviderType::CompressedTar(Compression::Gzip),
        ProviderType::CompressedTar(Compression::Bzip2),
        ProviderType::Zip,
    ] {
        if let Ok(entries) = provider.entries_from(Cursor::new(data)) {
            for entry in entries {
                let _ = entry.to_string();
            }
        }
    }
});
