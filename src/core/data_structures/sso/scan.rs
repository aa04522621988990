/*!
 * Byte Scanning
 * Substring search primitives shared by strings and views
 */

/// C `isspace`: space, `\t`, `\n`, `\v`, `\f`, `\r`
#[inline(always)]
pub(super) fn is_c_space(byte: u8) -> bool {
    matches!(byte, b' ' | b'\t' | b'\n' | 0x0B | 0x0C | b'\r')
}

/// First occurrence of `needle`
pub(super) fn find_byte(haystack: &[u8], needle: u8) -> Option<usize> {
    #[cfg(all(target_arch = "x86_64", target_feature = "sse2"))]
    {
        if haystack.len() >= 16 {
            // SAFETY: sse2 is statically enabled for this target
            return unsafe { find_byte_sse2(haystack, needle) };
        }
    }

    haystack.iter().position(|&b| b == needle)
}

#[cfg(all(target_arch = "x86_64", target_feature = "sse2"))]
#[target_feature(enable = "sse2")]
unsafe fn find_byte_sse2(haystack: &[u8], needle: u8) -> Option<usize> {
    use std::arch::x86_64::*;

    let pattern = _mm_set1_epi8(needle as i8);
    let mut offset = 0;
    let len = haystack.len();

    // 16 bytes at a time
    while offset + 16 <= len {
        let data = _mm_loadu_si128(haystack.as_ptr().add(offset) as *const __m128i);
        let mask = _mm_movemask_epi8(_mm_cmpeq_epi8(data, pattern));
        if mask != 0 {
            return Some(offset + mask.trailing_zeros() as usize);
        }
        offset += 16;
    }

    haystack[offset..]
        .iter()
        .position(|&b| b == needle)
        .map(|p| offset + p)
}

/// First occurrence of `needle`; an empty needle matches at 0
pub(super) fn find_bytes(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    let Some((&first, _)) = needle.split_first() else {
        return Some(0);
    };
    if needle.len() > haystack.len() {
        return None;
    }

    let last_start = haystack.len() - needle.len();
    let mut offset = 0;
    while offset <= last_start {
        let at = offset + find_byte(&haystack[offset..=last_start], first)?;
        if &haystack[at..at + needle.len()] == needle {
            return Some(at);
        }
        offset = at + 1;
    }
    None
}

/// Last occurrence of `needle`; an empty needle matches at `haystack.len()`
pub(super) fn rfind_bytes(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() {
        return Some(haystack.len());
    }
    if needle.len() > haystack.len() {
        return None;
    }
    haystack.windows(needle.len()).rposition(|window| window == needle)
}

/// Non-overlapping occurrences of `needle`; zero for an empty needle
pub(super) fn count_bytes(haystack: &[u8], needle: &[u8]) -> usize {
    if needle.is_empty() {
        return 0;
    }
    let mut count = 0;
    let mut offset = 0;
    while let Some(pos) = find_bytes(&haystack[offset..], needle) {
        count += 1;
        offset += pos + needle.len();
    }
    count
}
