use core::cmp::Ordering;

/// Adjacent-swap sort that stops after the first pass without swaps.
pub(crate) fn bubble_sort_by<T, F>(data: &mut [T], mut compare: F)
where
    F: FnMut(&T, &T) -> Ordering,
{
    let n = data.len();
    if n < 2 {
        return;
    }
    for pass in 0..n - 1 {
        let mut swapped = false;
        for j in 0..n - pass - 1 {
            if compare(&data[j], &data[j + 1]) == Ordering::Greater {
                data.swap(j, j + 1);
                swapped = true;
            }
        }
        if !swapped {
            break;
        }
    }
}

/// Quicksort with the Lomuto partition scheme (last element as pivot).
///
/// The smaller side is sorted recursively and the larger side in the loop,
/// so stack depth stays logarithmic even when partitions are lopsided.
pub(crate) fn quick_sort_by<T, F>(data: &mut [T], mut compare: F)
where
    F: FnMut(&T, &T) -> Ordering,
{
    quick_sort_range(data, &mut compare);
}

fn quick_sort_range<T, F>(mut data: &mut [T], compare: &mut F)
where
    F: FnMut(&T, &T) -> Ordering,
{
    while data.len() > 1 {
        let pivot = partition(data, compare);
        let (low, rest) = core::mem::take(&mut data).split_at_mut(pivot);
        let high = &mut rest[1..];
        if low.len() < high.len() {
            quick_sort_range(low, compare);
            data = high;
        } else {
            quick_sort_range(high, compare);
            data = low;
        }
    }
}

// Returns the resting index of the pivot. Requires data.len() >= 1.
fn partition<T, F>(data: &mut [T], compare: &mut F) -> usize
where
    F: FnMut(&T, &T) -> Ordering,
{
    let high = data.len() - 1;
    let mut boundary = 0;
    for j in 0..high {
        if compare(&data[j], &data[high]) != Ordering::Greater {
            data.swap(boundary, j);
            boundary += 1;
        }
    }
    data.swap(boundary, high);
    boundary
}
