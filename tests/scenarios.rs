//! Fixed-seed suites over sorted, reversed and unsorted inserts.
//! Every key is even, so `k - 1` and `k + 1` are always absent.

use skiplist_lanes::{Config, SkipList};
use std::collections::HashSet;

const SEED: u64 = 0;

struct Fixture {
    sk: SkipList<i64, i64>,
    sorted: Vec<i64>,
}

fn configs() -> Vec<Config> {
    vec![
        Config::default().with_seed(SEED),
        Config::default().with_seed(SEED).with_hash_index(false),
        Config::default().with_seed(SEED).with_max_level(4),
        Config::default().with_seed(SEED).with_probability(0.25),
    ]
}

fn unsorted(config: Config) -> Fixture {
    let mut sk = SkipList::with_config(config).unwrap();
    let mut data = vec![4, 2, 10, 6, 8, 12, 18, 14, 16];
    for &kv in &data {
        sk.set(kv, kv);
    }
    // Setting twice overwrites.
    for &kv in data.iter().rev() {
        sk.set(kv, kv);
    }
    data.sort();
    Fixture { sk, sorted: data }
}

fn sorted(config: Config) -> Fixture {
    let mut sk = SkipList::with_config(config).unwrap();
    let data: Vec<i64> = (0..1 << 12).map(|i| 2 * i).collect();
    for &kv in &data {
        sk.set(kv, kv);
    }
    Fixture { sk, sorted: data }
}

fn reversed(config: Config) -> Fixture {
    let mut sk = SkipList::with_config(config).unwrap();
    let data: Vec<i64> = (0..1 << 12).map(|i| 2 * i).collect();
    for &kv in data.iter().rev() {
        sk.set(kv, kv);
    }
    Fixture { sk, sorted: data }
}

fn fixtures() -> Vec<Fixture> {
    let mut out = Vec::new();
    for config in configs() {
        out.push(unsorted(config.clone()));
        out.push(sorted(config.clone()));
        out.push(reversed(config));
    }
    out
}

fn value_of(entry: Option<skiplist_lanes::Entry<'_, i64, i64>>) -> Option<i64> {
    entry.map(|e| *e.value())
}

fn assert_walks(sk: &SkipList<i64, i64>, expected: &[i64]) {
    let mut forward = Vec::new();
    let mut cursor = sk.first();
    while let Some(entry) = cursor {
        forward.push(*entry.value());
        cursor = entry.next();
    }
    assert_eq!(forward, expected);

    let mut backward = Vec::new();
    let mut cursor = sk.last();
    while let Some(entry) = cursor {
        backward.push(*entry.value());
        cursor = entry.prev();
    }
    backward.reverse();
    assert_eq!(backward, expected);
}

#[test]
fn length() {
    for f in fixtures() {
        assert_eq!(f.sk.len(), f.sorted.len());
        assert_walks(&f.sk, &f.sorted);
    }
}

#[test]
fn contains() {
    for f in fixtures() {
        for &k in &f.sorted {
            assert!(f.sk.contains_key(&k));
            assert!(!f.sk.contains_key(&(k - 1)));
            assert!(!f.sk.contains_key(&(k + 1)));
        }
    }
}

#[test]
fn get() {
    for f in fixtures() {
        for &k in &f.sorted {
            assert_eq!(value_of(f.sk.get(&k)), Some(k));
            assert_eq!(value_of(f.sk.get(&(k - 1))), None);
            assert_eq!(value_of(f.sk.get(&(k + 1))), None);
        }
    }
}

#[test]
fn remove() {
    for mut f in fixtures() {
        let n = f.sorted.len();
        let mut deleted = HashSet::new();
        for &i in &[0, n - 1, n / 2] {
            let k = f.sorted[i];
            if !deleted.insert(k) {
                continue;
            }
            assert_eq!(f.sk.remove(&k), Some((k, k)));
            assert_eq!(f.sk.remove(&k), None);
            assert!(!f.sk.contains_key(&k));
            assert_eq!(f.sk.len(), n - deleted.len());
        }
        let remaining: Vec<i64> = f
            .sorted
            .iter()
            .copied()
            .filter(|k| !deleted.contains(k))
            .collect();
        assert_walks(&f.sk, &remaining);
    }
}

#[test]
fn remove_first() {
    for mut f in fixtures() {
        let n = f.sorted.len().min(3);
        for i in 0..n {
            assert_eq!(f.sk.remove_first().map(|(k, _)| k), Some(f.sorted[i]));
        }
        assert_eq!(f.sk.len(), f.sorted.len() - n);
        assert_walks(&f.sk, &f.sorted[n..]);
    }
}

#[test]
fn remove_first_until_empty() {
    for mut f in fixtures() {
        for _ in 0..f.sorted.len() {
            assert!(f.sk.remove_first().is_some());
        }
        assert!(f.sk.is_empty());
        assert!(f.sk.first().is_none());
        assert!(f.sk.last().is_none());
        assert!(f.sk.remove_first().is_none());
    }
}

#[test]
fn remove_everything() {
    for mut f in fixtures() {
        for &k in &f.sorted {
            assert!(f.sk.remove(&k).is_some());
        }
        assert_eq!(f.sk.len(), 0);
        assert!(f.sk.first().is_none());
        assert!(f.sk.last().is_none());
    }
}

#[test]
fn before() {
    for f in fixtures() {
        for (i, &k) in f.sorted.iter().enumerate() {
            assert_eq!(value_of(f.sk.before(&(k + 1))), Some(k));
            let expected = if i == 0 { None } else { Some(f.sorted[i - 1]) };
            assert_eq!(value_of(f.sk.before(&k)), expected);
            assert_eq!(value_of(f.sk.before(&(k - 1))), expected);
        }
    }
}

#[test]
fn after() {
    for f in fixtures() {
        let last = f.sorted.len() - 1;
        for (i, &k) in f.sorted.iter().enumerate() {
            assert_eq!(value_of(f.sk.after(&(k - 1))), Some(k));
            let expected = if i == last { None } else { Some(f.sorted[i + 1]) };
            assert_eq!(value_of(f.sk.after(&k)), expected);
            assert_eq!(value_of(f.sk.after(&(k + 1))), expected);
        }
    }
}

#[test]
fn at_or_before() {
    for f in fixtures() {
        for (i, &k) in f.sorted.iter().enumerate() {
            assert_eq!(value_of(f.sk.at_or_before(&k)), Some(k));
            assert_eq!(value_of(f.sk.at_or_before(&(k + 1))), Some(k));
            let expected = if i == 0 { None } else { Some(f.sorted[i - 1]) };
            assert_eq!(value_of(f.sk.at_or_before(&(k - 1))), expected);
        }
    }
}

#[test]
fn at_or_after() {
    for f in fixtures() {
        let last = f.sorted.len() - 1;
        for (i, &k) in f.sorted.iter().enumerate() {
            assert_eq!(value_of(f.sk.at_or_after(&k)), Some(k));
            assert_eq!(value_of(f.sk.at_or_after(&(k - 1))), Some(k));
            let expected = if i == last { None } else { Some(f.sorted[i + 1]) };
            assert_eq!(value_of(f.sk.at_or_after(&(k + 1))), expected);
        }
    }
}

#[test]
fn nearest_scenario() {
    let f = unsorted(Config::default().with_seed(SEED));
    assert_eq!(*f.sk.first().unwrap().key(), 2);
    assert_eq!(*f.sk.last().unwrap().key(), 18);
    assert_eq!(*f.sk.search(&7).unwrap().key(), 8);
    assert_eq!(*f.sk.before(&8).unwrap().key(), 6);
    assert_eq!(*f.sk.at_or_after(&8).unwrap().key(), 8);
}

#[test]
fn same_seed_same_debug_table() {
    let a = sorted(Config::default().with_seed(11));
    let b = sorted(Config::default().with_seed(11));
    assert_eq!(format!("{:?}", a.sk), format!("{:?}", b.sk));
}

#[test]
fn invalid_configs_are_rejected() {
    assert!(SkipList::<i64, i64>::with_config(Config::default().with_max_level(0)).is_err());
    assert!(SkipList::<i64, i64>::with_config(Config::default().with_probability(-1.0)).is_err());
    assert!(SkipList::<i64, i64>::with_config(Config::default().with_probability(1.01)).is_err());
}
