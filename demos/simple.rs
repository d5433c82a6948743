/// Run this example with cargo run --example simple
use skiplist_lanes::{SkipList, SkipSet};

fn main() {
    let mut sk: SkipList<u32, &str> = vec![(0, "zero"), (1, "one"), (2, "two")]
        .into_iter()
        .collect();

    // print the skiplist
    // warning: this prints one row per lane in use
    println!("{:?}", sk);

    // Test association
    if sk.contains_key(&0) {
        println!("It contains 0!");
    }
    if !sk.contains_key(&99) {
        println!("It doesn't contain 99 :C");
    }
    // Insert and remove elements
    if sk.insert(99, "ninety-nine").is_none() {
        println!("... it now contains 99 🎉");
    }
    // Keys are unique, the value is swapped in place
    if let Some(old) = sk.insert(99, "NINETY-NINE") {
        println!("... replaced {:?}", old);
    }

    if let Some((k, v)) = sk.remove(&99) {
        println!("... I removed {} => {}", k, v);
    }

    // Nearest-key queries
    sk.insert(100, "hundred");
    sk.insert(200, "two hundred");
    dbg!(sk.before(&100).map(|e| *e.key()));
    dbg!(sk.at_or_after(&101).map(|e| *e.key()));

    // Walk from an entry in either direction
    if let Some(entry) = sk.get(&100) {
        dbg!(entry.prev().map(|e| *e.value()), entry.next().map(|e| *e.value()));
    }

    // Pop from the front in O(1)
    dbg!(sk.remove_first());
    dbg!(sk.remove_last());

    // We can check how many elements are in the skiplist
    dbg!(sk.len(), sk.is_empty());

    // Let's make a big skiplist
    let sk: SkipList<u32, ()> = (0..1000).map(|i| (i, ())).collect();

    // Lets iterate over all of them
    let all_eles: Vec<_> = sk.keys().collect();
    dbg!((all_eles.len(), sk.len()));

    // Lets iterate over a range
    dbg!(sk.range(&700, &705).map(|(k, _)| k).collect::<Vec<_>>());

    // Multisets keep duplicates and hand out handles
    let mut set = SkipSet::new();
    let ids: Vec<_> = (0..4).map(|_| set.add("same")).collect();
    ids[2].remove_from(&mut set);
    dbg!(set.len());
}
