//! Connected-region labeling and small-region removal.
//!
//! Two-pass labeling with a union-find equivalence table. Uses
//! 4-connectivity: only horizontal and vertical neighbors are connected.

use crate::image_pipeline::mask::types::Mask;

/// Background label in a label buffer.
pub const BACKGROUND: usize = 0;

fn find_root(parents: &mut [usize], label: usize) -> usize {
    let mut current = label;
    while current != parents[current] {
        // Path halving
        parents[current] = parents[parents[current]];
        current = parents[current];
    }
    current
}

fn union_labels(parents: &mut [usize], a: usize, b: usize) {
    let root_a = find_root(parents, a);
    let root_b = find_root(parents, b);
    if root_a < root_b {
        parents[root_b] = root_a;
    } else if root_b < root_a {
        parents[root_a] = root_b;
    }
}

/// Labels connected foreground regions.
///
/// Returns the row-major label buffer (background = 0, regions numbered
/// consecutively from 1) and the number of regions.
pub fn label_regions(mask: &Mask) -> (Vec<usize>, usize) {
    let (width, height) = (mask.width, mask.height);
    let mut labels = vec![BACKGROUND; width * height];
    let mut parents = vec![BACKGROUND];

    for y in 0..height {
        for x in 0..width {
            let i = y * width + x;
            if !mask.data[i] {
                continue;
            }

            let up = if y > 0 { labels[i - width] } else { BACKGROUND };
            let left = if x > 0 { labels[i - 1] } else { BACKGROUND };

            labels[i] = match (up, left) {
                (BACKGROUND, BACKGROUND) => {
                    let label = parents.len();
                    parents.push(label);
                    label
                }
                (l, BACKGROUND) | (BACKGROUND, l) => l,
                (u, l) => {
                    union_labels(&mut parents, u, l);
                    u.min(l)
                }
            };
        }
    }

    // Resolve every provisional label to a consecutive final label
    let mut relabel = vec![BACKGROUND; parents.len()];
    let mut next = 1;
    for label in 1..parents.len() {
        let root = find_root(&mut parents, label);
        if relabel[root] == BACKGROUND {
            relabel[root] = next;
            next += 1;
        }
        relabel[label] = relabel[root];
    }

    for label in labels.iter_mut() {
        *label = relabel[*label];
    }

    (labels, next - 1)
}

/// Clears every connected region with fewer than `min_size` pixels.
pub fn remove_small_regions(mask: &Mask, min_size: usize) -> Mask {
    if min_size <= 1 {
        return mask.clone();
    }

    let (labels, count) = label_regions(mask);
    let mut sizes = vec![0usize; count + 1];
    for &label in &labels {
        sizes[label] += 1;
    }

    let data = labels
        .iter()
        .map(|&label| label != BACKGROUND && sizes[label] >= min_size)
        .collect();

    Mask {
        width: mask.width,
        height: mask.height,
        data,
    }
}
