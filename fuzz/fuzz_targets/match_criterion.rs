#![no_main]

use libfuzzer_sys::fuzz_target;
use libslipit::MatchCriterion;

fuzz_target!(|data: (&str, &str)| {
    let (pattern, name) = data;
    if let Ok(criterion) = MatchCriterion::glob(pattern) {
        let _ = criterion.matches(name);
    }
    let substring = MatchCriterion::substring(pattern);
    assert_eq!(substring.matches(name), name.contains(pattern));
});
