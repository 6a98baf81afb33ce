// Bucket arithmetic exercised through the public helpers.
use altdict::{bucket_count_for_capacity, is_prime, next_bucket_count, normalize_hash};

// Test: exact growth values.
#[test]
fn growth_values() {
    assert_eq!(next_bucket_count(0), 3);
    assert_eq!(next_bucket_count(1), 3);
    assert_eq!(next_bucket_count(5), 11);
    assert_eq!(next_bucket_count(17), 37);
    assert_eq!(next_bucket_count(40), 83);
}

// Test: every growth step is prime and more than doubles.
#[test]
fn growth_is_prime_and_geometric() {
    let mut n = 3;
    for _ in 0..20 {
        let next = next_bucket_count(n);
        assert!(is_prime(next));
        assert!(next > 2 * n);
        n = next;
    }
}

// Test: indices always land in range, including for negative hashes.
#[test]
fn normalized_indices_are_in_range() {
    for count in [1usize, 3, 7, 17, 101] {
        for raw in [0, 1, -1, 42, -42, i32::MAX, i32::MIN] {
            assert!(normalize_hash(Some(raw), count) < count);
        }
        assert_eq!(normalize_hash(None, count), 0);
    }
    assert_eq!(normalize_hash(Some(-1), 7), 6);
    assert_eq!(normalize_hash(Some(5), 0), 0);
}

#[test]
fn capacity_hints() {
    assert_eq!(bucket_count_for_capacity(0), 3);
    assert_eq!(bucket_count_for_capacity(3), 3);
    assert_eq!(bucket_count_for_capacity(8), 11);
    assert_eq!(bucket_count_for_capacity(100), 101);
}
