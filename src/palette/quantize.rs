use crate::config::model::QuantizeMethod;

/// Largest palette a GIF frame can carry.
pub const MAX_PALETTE_COLORS: usize = 256;

/// An opaque RGB color.
pub type Rgb = [u8; 3];

/// A distinct color and the number of pixels that use it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ColorCount {
    /// The color.
    pub rgb: Rgb,
    /// Pixels with this color.
    pub count: u32,
}

/// Count distinct colors in a packed RGB8 buffer, ordered by color.
pub fn histogram(rgb: &[u8]) -> Vec<ColorCount> {
    let mut keys: Vec<u32> = rgb
        .chunks_exact(3)
        .map(|p| (u32::from(p[0]) << 16) | (u32::from(p[1]) << 8) | u32::from(p[2]))
        .collect();
    keys.sort_unstable();

    let mut out: Vec<ColorCount> = Vec::new();
    for key in keys {
        let rgb = [(key >> 16) as u8, (key >> 8) as u8, key as u8];
        match out.last_mut() {
            Some(last) if last.rgb == rgb => last.count += 1,
            _ => out.push(ColorCount { rgb, count: 1 }),
        }
    }
    out
}

/// Build a palette of at most `max_colors` entries for `hist`.
///
/// When the histogram already fits, its colors are the palette and the mapping is exact.
pub fn build_palette(hist: &[ColorCount], method: QuantizeMethod, max_colors: usize) -> Vec<Rgb> {
    let max_colors = max_colors.clamp(1, MAX_PALETTE_COLORS);
    if hist.is_empty() {
        return vec![[0, 0, 0]];
    }
    if hist.len() <= max_colors {
        return hist.iter().map(|c| c.rgb).collect();
    }
    match method {
        QuantizeMethod::MedianCut => split_boxes(hist, max_colors, SplitRule::PopulationMedian),
        QuantizeMethod::MaxCoverage => split_boxes(hist, max_colors, SplitRule::ExtentMidpoint),
        QuantizeMethod::FastOctree => octree_palette(hist, max_colors),
    }
}

#[derive(Clone, Copy)]
enum SplitRule {
    PopulationMedian,
    ExtentMidpoint,
}

struct ColorBox {
    colors: Vec<ColorCount>,
    min: Rgb,
    max: Rgb,
    population: u64,
}

impl ColorBox {
    fn from_colors(colors: Vec<ColorCount>) -> Self {
        let mut min = [255u8; 3];
        let mut max = [0u8; 3];
        let mut population = 0u64;
        for c in &colors {
            for ch in 0..3 {
                min[ch] = min[ch].min(c.rgb[ch]);
                max[ch] = max[ch].max(c.rgb[ch]);
            }
            population += u64::from(c.count);
        }
        Self {
            colors,
            min,
            max,
            population,
        }
    }

    /// Longest axis and its extent.
    fn extent(&self) -> (usize, u8) {
        (0..3)
            .map(|ch| (ch, self.max[ch] - self.min[ch]))
            .fold((0, 0), |best, cur| if cur.1 > best.1 { cur } else { best })
    }

    fn can_split(&self) -> bool {
        self.colors.len() > 1
    }

    fn score(&self, rule: SplitRule) -> u64 {
        let (_, extent) = self.extent();
        match rule {
            SplitRule::PopulationMedian => self.population * u64::from(extent),
            SplitRule::ExtentMidpoint => u64::from(extent),
        }
    }

    fn split(self, rule: SplitRule) -> (ColorBox, ColorBox) {
        let (axis, _) = self.extent();
        let mut colors = self.colors;
        colors.sort_unstable_by_key(|c| c.rgb[axis]);

        let idx = match rule {
            SplitRule::PopulationMedian => {
                let half = self.population / 2;
                let mut acc = 0u64;
                colors
                    .iter()
                    .position(|c| {
                        acc += u64::from(c.count);
                        acc >= half
                    })
                    .map_or(1, |i| i + 1)
            }
            SplitRule::ExtentMidpoint => {
                let mid = ((u16::from(self.min[axis]) + u16::from(self.max[axis])) / 2) as u8;
                colors.partition_point(|c| c.rgb[axis] <= mid)
            }
        };
        // Both halves keep at least one color.
        let idx = idx.clamp(1, colors.len() - 1);
        let right = colors.split_off(idx);
        (ColorBox::from_colors(colors), ColorBox::from_colors(right))
    }

    fn mean(&self) -> Rgb {
        let mut sum = [0u64; 3];
        for c in &self.colors {
            for ch in 0..3 {
                sum[ch] += u64::from(c.rgb[ch]) * u64::from(c.count);
            }
        }
        weighted_mean(sum, self.population)
    }
}

fn weighted_mean(sum: [u64; 3], count: u64) -> Rgb {
    if count == 0 {
        return [0, 0, 0];
    }
    let avg = |s: u64| ((s + count / 2) / count).min(255) as u8;
    [avg(sum[0]), avg(sum[1]), avg(sum[2])]
}

fn split_boxes(hist: &[ColorCount], max_colors: usize, rule: SplitRule) -> Vec<Rgb> {
    let mut boxes = vec![ColorBox::from_colors(hist.to_vec())];
    while boxes.len() < max_colors {
        let Some(idx) = boxes
            .iter()
            .enumerate()
            .filter(|(_, b)| b.can_split())
            .max_by_key(|(_, b)| b.score(rule))
            .map(|(i, _)| i)
        else {
            break;
        };
        let (l, r) = boxes.swap_remove(idx).split(rule);
        boxes.push(l);
        boxes.push(r);
    }
    boxes.iter().map(ColorBox::mean).collect()
}

const OCTREE_DEPTH: usize = 8;

#[derive(Default)]
struct OctreeNode {
    sum: [u64; 3],
    count: u64,
    children: [Option<usize>; 8],
    leaf: bool,
}

fn octant(rgb: Rgb, level: usize) -> usize {
    let shift = 7 - level;
    (usize::from((rgb[0] >> shift) & 1) << 2)
        | (usize::from((rgb[1] >> shift) & 1) << 1)
        | usize::from((rgb[2] >> shift) & 1)
}

fn octree_palette(hist: &[ColorCount], max_colors: usize) -> Vec<Rgb> {
    let mut nodes = vec![OctreeNode::default()];
    // Internal nodes by depth, candidates for reduction.
    let mut levels: Vec<Vec<usize>> = vec![Vec::new(); OCTREE_DEPTH];
    levels[0].push(0);
    let mut leaves = 0usize;

    for c in hist {
        let mut node = 0usize;
        for level in 0..=OCTREE_DEPTH {
            let n = &mut nodes[node];
            for ch in 0..3 {
                n.sum[ch] += u64::from(c.rgb[ch]) * u64::from(c.count);
            }
            n.count += u64::from(c.count);
            if level == OCTREE_DEPTH {
                if !n.leaf {
                    n.leaf = true;
                    leaves += 1;
                }
                break;
            }
            let slot = octant(c.rgb, level);
            node = match nodes[node].children[slot] {
                Some(child) => child,
                None => {
                    let child = nodes.len();
                    nodes.push(OctreeNode::default());
                    nodes[node].children[slot] = Some(child);
                    if level + 1 < OCTREE_DEPTH {
                        levels[level + 1].push(child);
                    }
                    child
                }
            };
        }
    }

    // Fold the lightest deepest nodes first.
    for level in levels.iter_mut() {
        level.sort_unstable_by_key(|&i| std::cmp::Reverse(nodes[i].count));
    }
    for depth in (0..OCTREE_DEPTH).rev() {
        while leaves > max_colors {
            let Some(idx) = levels[depth].pop() else {
                break;
            };
            let merged = nodes[idx].children.iter().flatten().count();
            nodes[idx].children = [None; 8];
            nodes[idx].leaf = true;
            leaves = leaves + 1 - merged;
        }
    }

    let mut palette = Vec::with_capacity(leaves);
    let mut stack = vec![0usize];
    while let Some(i) = stack.pop() {
        let n = &nodes[i];
        if n.leaf {
            palette.push(weighted_mean(n.sum, n.count));
        } else {
            stack.extend(n.children.iter().flatten().copied());
        }
    }
    palette
}

#[cfg(test)]
#[path = "../../tests/unit/palette/quantize.rs"]
mod tests;
