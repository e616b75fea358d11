//! Shrinking strategies for minimizing failing values.
//!
//! Every strategy here upholds the same contract: the candidates never
//! include the input, and each candidate is strictly smaller than the input
//! under a well-founded measure. Repeatedly shrinking any value therefore
//! reaches a value with no candidates.

use num_traits::Float;

/// Shrink an integer towards zero.
///
/// Negative values first propose their negation. After that come `0` and the
/// halving sequence `x - x/2, x - x/4, ..., x - 1`, all strictly closer to zero.
pub fn shrink_integral(x: i128) -> Vec<i128> {
    let mut candidates = Vec::new();
    if x < 0 {
        if let Some(negated) = x.checked_neg() {
            candidates.push(negated);
        }
    }
    if x != 0 {
        candidates.push(0);
    }

    let mut step = x / 2;
    while step != 0 {
        let candidate = x - step;
        if candidate.unsigned_abs() < x.unsigned_abs() && !candidates.contains(&candidate) {
            candidates.push(candidate);
        }
        step /= 2;
    }
    candidates
}

/// Shrink a float towards zero.
///
/// NaN and infinities shrink straight to zero. Finite values propose zero,
/// their negation when negative, their truncation, and their half.
pub fn shrink_float<F: Float>(x: F) -> Vec<F> {
    if x.is_nan() || x.is_infinite() {
        return vec![F::zero()];
    }
    if x == F::zero() {
        return Vec::new();
    }

    let mut candidates = vec![F::zero()];
    if x < F::zero() {
        candidates.push(-x);
    }

    let truncated = x.trunc();
    if truncated != x && truncated != F::zero() {
        candidates.push(truncated);
    }

    let two = F::one() + F::one();
    let half = x / two;
    if half != F::zero() && half.abs() < x.abs() && half != truncated {
        candidates.push(half);
    }
    candidates
}

/// Shrink a boolean: `true` becomes `false`
pub fn shrink_bool(value: bool) -> Vec<bool> {
    if value { vec![false] } else { Vec::new() }
}

// Lower keys are simpler: lowercase, then uppercase, then digits, then the
// space, then other whitespace, then everything else, ties broken by code point.
fn char_simplicity(c: char) -> (bool, bool, bool, bool, bool, u32) {
    (
        !c.is_lowercase(),
        !c.is_uppercase(),
        !c.is_ascii_digit(),
        c != ' ',
        !c.is_whitespace(),
        c as u32,
    )
}

/// Shrink a character towards `'a'`
pub fn shrink_char(c: char) -> Vec<char> {
    let lowered = if c.is_uppercase() {
        c.to_lowercase().next()
    } else {
        None
    };

    let preferred = ['a', 'b', 'c']
        .into_iter()
        .chain(lowered)
        .chain(['A', 'B', 'C', '1', '2', '3', ' ', '\n']);

    let key = char_simplicity(c);
    let mut candidates: Vec<char> = Vec::new();
    for candidate in preferred {
        if char_simplicity(candidate) < key && !candidates.contains(&candidate) {
            candidates.push(candidate);
        }
    }
    candidates
}

/// Shrink a list.
///
/// First removes aligned chunks of `n`, `n/2`, ..., `1` elements, then
/// replaces one element at a time by each of its own shrinks.
pub fn shrink_list<T, F, I>(xs: &[T], shrink_element: F) -> Vec<Vec<T>>
where
    T: Clone,
    F: Fn(&T) -> I,
    I: IntoIterator<Item = T>,
{
    let n = xs.len();
    let mut candidates = Vec::new();

    let mut chunk = n;
    while chunk > 0 {
        let mut start = 0;
        while start + chunk <= n {
            let mut removed = Vec::with_capacity(n - chunk);
            removed.extend_from_slice(&xs[..start]);
            removed.extend_from_slice(&xs[start + chunk..]);
            candidates.push(removed);
            start += chunk;
        }
        chunk /= 2;
    }

    for (i, element) in xs.iter().enumerate() {
        for smaller in shrink_element(element) {
            let mut replaced = xs.to_vec();
            replaced[i] = smaller;
            candidates.push(replaced);
        }
    }
    candidates
}
