// src/kernels.rs
// Pure numeric kernels: Fibonacci, prime filter, HCF, LCM

use thiserror::Error;

/// Failures a kernel can report for input the validator should already have excluded
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KernelError {
    #[error("input sequence is empty")]
    EmptyInput,

    #[error("arithmetic overflow in {0}")]
    Overflow(&'static str),
}

/// Largest `n` for which every term up to `F(n)` fits in a `u128`
pub const MAX_FIBONACCI_INDEX: u32 = 186;

/// Fibonacci numbers `F(0)..=F(n)`
pub fn fibonacci(n: u32) -> Result<Vec<u128>, KernelError> {
    let mut sequence: Vec<u128> = Vec::with_capacity(n as usize + 1);
    sequence.push(0);
    if n == 0 {
        return Ok(sequence);
    }
    sequence.push(1);

    for i in 2..=n as usize {
        let next = sequence[i - 1]
            .checked_add(sequence[i - 2])
            .ok_or(KernelError::Overflow("fibonacci"))?;
        sequence.push(next);
    }

    Ok(sequence)
}

/// Trial division over 6k ± 1 candidates
pub fn is_prime(n: i128) -> bool {
    if n <= 1 {
        return false;
    }
    if n <= 3 {
        return true;
    }
    if n % 2 == 0 || n % 3 == 0 {
        return false;
    }

    // i * i overflows before exceeding n only near i128::MAX
    let mut i: i128 = 5;
    while i.checked_mul(i).is_some_and(|square| square <= n) {
        if n % i == 0 || n % (i + 2) == 0 {
            return false;
        }
        i += 6;
    }
    true
}

/// Keep only the prime elements, preserving order and duplicates
pub fn filter_primes(values: &[i128]) -> Vec<i128> {
    values.iter().copied().filter(|&n| is_prime(n)).collect()
}

/// Euclid's algorithm; `gcd(a, 0) == a`
pub fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

/// Highest common factor of every element
pub fn hcf(values: &[u64]) -> Result<u64, KernelError> {
    let (&first, rest) = values.split_first().ok_or(KernelError::EmptyInput)?;
    Ok(rest.iter().fold(first, |acc, &n| gcd(acc, n)))
}

/// Least common multiple of every element
pub fn lcm(values: &[u64]) -> Result<u64, KernelError> {
    let (&first, rest) = values.split_first().ok_or(KernelError::EmptyInput)?;
    rest.iter().try_fold(first, |acc, &n| {
        let divisor = gcd(acc, n);
        if divisor == 0 {
            return Ok(0);
        }
        (acc / divisor)
            .checked_mul(n)
            .ok_or(KernelError::Overflow("lcm"))
    })
}
