//! K-means clustering over the pixel population, for palette reduction.
//!
//! This is Lloyd's algorithm in RGB space: assign every pixel to its nearest
//! mean, recompute each mean from its members, and repeat until an
//! assignment pass changes nothing. It runs over the flat color list of a
//! buffer and is independent of the ordered filter pipeline.

use palette::Srgb;

/// A reasonable iteration bound for [`cluster`] when the caller has no
/// better number: comfortably above what typical images need to converge.
pub const DEFAULT_MAX_ITERATIONS: u32 = 100;

/// A pixel color tagged with the index of the mean it is assigned to.
///
/// Only lives for the duration of a clustering run; nothing persists it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClusteredColor {
    /// The pixel's color.
    pub color: Srgb<u8>,
    /// Index into the means array.
    pub cluster: usize,
}

/// The result of a [`cluster`] run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterOutput {
    /// The final means, one per initial mean.
    pub means: Vec<Srgb<u8>>,
    /// Every input color with its final cluster assignment, in input order.
    pub clusters: Vec<ClusteredColor>,
    /// How many update-and-reassign passes ran.
    pub iterations: u32,
    /// Whether a pass produced zero reassignments within the iteration
    /// bound. When `false`, the returned means and assignments are the
    /// state after the final bounded pass.
    pub converged: bool,
}

/// Euclidean distance between two colors in RGB space.
fn distance(a: Srgb<u8>, b: Srgb<u8>) -> f64 {
    let dr = f64::from(i32::from(a.red) - i32::from(b.red));
    let dg = f64::from(i32::from(a.green) - i32::from(b.green));
    let db = f64::from(i32::from(a.blue) - i32::from(b.blue));
    (dr * dr + dg * dg + db * db).sqrt()
}

/// The index of the mean nearest to `color`. Ties go to the lowest index.
fn nearest(color: Srgb<u8>, means: &[Srgb<u8>]) -> usize {
    let mut best = 0;
    let mut best_distance = distance(color, means[0]);
    for (i, &mean) in means.iter().enumerate().skip(1) {
        let d = distance(color, mean);
        if d < best_distance {
            best = i;
            best_distance = d;
        }
    }
    best
}

/// Recomputes every mean as the truncated per-channel average of its
/// members. A cluster with no members keeps its previous mean.
fn update_means(means: &mut [Srgb<u8>], data: &[ClusteredColor]) {
    let mut sums = vec![[0u64; 3]; means.len()];
    let mut counts = vec![0u64; means.len()];
    for p in data {
        sums[p.cluster][0] += u64::from(p.color.red);
        sums[p.cluster][1] += u64::from(p.color.green);
        sums[p.cluster][2] += u64::from(p.color.blue);
        counts[p.cluster] += 1;
    }
    for ((mean, sum), &count) in means.iter_mut().zip(&sums).zip(&counts) {
        if count > 0 {
            #[allow(clippy::cast_possible_truncation)]
            {
                *mean = Srgb::new(
                    (sum[0] / count) as u8,
                    (sum[1] / count) as u8,
                    (sum[2] / count) as u8,
                );
            }
        }
    }
}

/// Clusters `colors` around `initial_means` until assignments stop changing
/// or `max_iterations` update-and-reassign passes have run.
///
/// The caller supplies the initial means; nothing is seeded internally, so
/// the run is fully deterministic. Degenerate configurations can oscillate
/// between assignments forever, which is why the iteration bound exists:
/// rather than hang, the run stops and reports `converged: false`.
#[must_use]
pub fn cluster(
    colors: &[Srgb<u8>],
    initial_means: &[Srgb<u8>],
    max_iterations: u32,
) -> ClusterOutput {
    if colors.is_empty() || initial_means.is_empty() {
        return ClusterOutput {
            means: initial_means.to_vec(),
            clusters: Vec::new(),
            iterations: 0,
            converged: true,
        };
    }

    let mut means = initial_means.to_vec();
    let mut data = colors
        .iter()
        .map(|&color| ClusteredColor { color, cluster: nearest(color, &means) })
        .collect::<Vec<_>>();

    let mut iterations = 0;
    let mut converged = false;
    while iterations < max_iterations {
        iterations += 1;
        update_means(&mut means, &data);

        let mut changes = 0u64;
        for p in &mut data {
            let cluster = nearest(p.color, &means);
            if cluster != p.cluster {
                p.cluster = cluster;
                changes += 1;
            }
        }
        log::trace!("k-means pass {iterations}: {changes} reassignments");
        if changes == 0 {
            converged = true;
            break;
        }
    }

    if converged {
        log::debug!("k-means converged after {iterations} passes");
    } else {
        log::warn!("k-means stopped at the {max_iterations}-pass bound without converging");
    }

    ClusterOutput { means, clusters: data, iterations, converged }
}
