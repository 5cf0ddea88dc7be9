//! Median-cut color quantization.
//!
//! Distinct colors are counted, then the color box with the widest channel
//! spread is repeatedly split at its population-weighted median until the
//! requested number of boxes exists or no box can be split further. Each box
//! contributes the weighted mean of its colors.

use std::collections::HashMap;

/// A contiguous run of histogram entries.
#[derive(Debug, Clone, Copy)]
struct ColorBox {
    start: usize,
    end: usize,
    population: u64,
    channel: usize,
    spread: u8,
}

impl ColorBox {
    fn new(entries: &[([u8; 3], u32)], start: usize, end: usize) -> Self {
        let mut min = [u8::MAX; 3];
        let mut max = [u8::MIN; 3];
        let mut population = 0u64;
        for (color, count) in &entries[start..end] {
            for c in 0..3 {
                min[c] = min[c].min(color[c]);
                max[c] = max[c].max(color[c]);
            }
            population += *count as u64;
        }
        let (channel, spread) = (0..3)
            .map(|c| (c, max[c].saturating_sub(min[c])))
            .fold((0, 0), |best, cur| if cur.1 > best.1 { cur } else { best });
        Self {
            start,
            end,
            population,
            channel,
            spread,
        }
    }

    fn len(&self) -> usize {
        self.end - self.start
    }

    fn mean(&self, entries: &[([u8; 3], u32)]) -> [u8; 3] {
        let mut sum = [0u64; 3];
        for (color, count) in &entries[self.start..self.end] {
            for c in 0..3 {
                sum[c] += color[c] as u64 * *count as u64;
            }
        }
        let n = self.population.max(1);
        [
            ((sum[0] + n / 2) / n) as u8,
            ((sum[1] + n / 2) / n) as u8,
            ((sum[2] + n / 2) / n) as u8,
        ]
    }
}

/// Reduces `pixels` to at most `max_colors` representative colors.
///
/// Inputs with no more distinct colors than `max_colors` come back exactly,
/// one entry per distinct color.
pub fn median_cut<I>(pixels: I, max_colors: usize) -> Vec<[u8; 3]>
where
    I: IntoIterator<Item = [u8; 3]>,
{
    let mut histogram: HashMap<[u8; 3], u32> = HashMap::new();
    for pixel in pixels {
        *histogram.entry(pixel).or_insert(0) += 1;
    }
    if histogram.is_empty() || max_colors == 0 {
        return Vec::new();
    }

    let mut entries: Vec<([u8; 3], u32)> = histogram.into_iter().collect();
    entries.sort_unstable();

    let mut boxes = vec![ColorBox::new(&entries, 0, entries.len())];
    while boxes.len() < max_colors {
        let candidate = boxes
            .iter()
            .enumerate()
            .filter(|(_, b)| b.len() > 1)
            .max_by_key(|(_, b)| (b.spread, b.population))
            .map(|(i, _)| i);
        let Some(index) = candidate else {
            break;
        };

        let target = boxes[index];
        let slice = &mut entries[target.start..target.end];
        slice.sort_unstable_by_key(|(color, _)| (color[target.channel], *color));

        let half = target.population.div_ceil(2);
        let mut cumulative = 0u64;
        let mut split = target.end - 1;
        for (i, (_, count)) in slice.iter().enumerate() {
            cumulative += *count as u64;
            if cumulative >= half {
                split = target.start + i + 1;
                break;
            }
        }
        let split = split.clamp(target.start + 1, target.end - 1);

        boxes[index] = ColorBox::new(&entries, target.start, split);
        boxes.push(ColorBox::new(&entries, split, target.end));
    }

    boxes.iter().map(|b| b.mean(&entries)).collect()
}
