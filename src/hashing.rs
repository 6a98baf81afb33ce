//! Stateless helpers for bucket indexing and prime-sized growth.

/// Smallest bucket array the dictionary ever uses.
pub const MIN_BUCKET_COUNT: usize = 3;

/// Map a raw 32-bit hash into `[0, bucket_count)`.
///
/// A key whose hash is unavailable (`None`) lands in bucket 0, as does
/// every key when `bucket_count` is 0. Negative hashes are shifted into
/// range rather than reinterpreted as unsigned.
#[inline]
pub fn normalize_hash(raw: Option<i32>, bucket_count: usize) -> usize {
    let Some(raw) = raw else {
        return 0;
    };
    if bucket_count == 0 {
        return 0;
    }
    let n = bucket_count as i64;
    let r = i64::from(raw) % n;
    if r < 0 {
        (r + n) as usize
    } else {
        r as usize
    }
}

/// Bucket count to grow to when `n` entries fill the table: the smallest
/// prime strictly greater than `2n`, and 3 for any `n < 2`.
pub fn next_bucket_count(n: usize) -> usize {
    if n < 2 {
        return MIN_BUCKET_COUNT;
    }
    let Some(doubled) = n.checked_mul(2) else {
        return n;
    };
    let mut candidate = doubled + 1;
    loop {
        if is_prime(candidate) {
            return candidate;
        }
        match candidate.checked_add(1) {
            Some(c) => candidate = c,
            None => return n,
        }
    }
}

/// Initial bucket count for a capacity hint: the smallest prime that is
/// at least `max(capacity, MIN_BUCKET_COUNT)`.
pub fn bucket_count_for_capacity(capacity: usize) -> usize {
    let mut candidate = capacity.max(MIN_BUCKET_COUNT);
    while !is_prime(candidate) {
        candidate += 1;
    }
    candidate
}

/// Trial division over the 6k±1 wheel.
pub fn is_prime(n: usize) -> bool {
    if n < 2 {
        return false;
    }
    if n < 4 {
        return true;
    }
    if n % 2 == 0 || n % 3 == 0 {
        return false;
    }
    let mut i = 5usize;
    while i <= n / i {
        if n % i == 0 || n % (i + 2) == 0 {
            return false;
        }
        i += 6;
    }
    true
}
