use crate::Rect;
use bevy_math::DVec2;

/// Compute the signed shoelace area of a ring. Counter-clockwise rings are
/// positive. The ring may be given open or closed (first == last).
#[must_use]
pub fn signed_area(ring: &[DVec2]) -> f64 {
    if ring.len() < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for i in 0..ring.len() {
        let a = ring[i];
        let b = ring[(i + 1) % ring.len()];
        sum += a.x * b.y - b.x * a.y;
    }
    0.5 * sum
}

/// Compute the unsigned area of a ring.
#[inline]
#[must_use]
pub fn area(ring: &[DVec2]) -> f64 {
    signed_area(ring).abs()
}

/// A coordinate run with its endpoints located along the cell perimeter, in
/// clockwise measure.
struct CoordinateChain<'a> {
    start: f64,
    stop: f64,
    coords: &'a [DVec2],
    visited: bool,
}

/// Compute the area of the subregion of `rect` lying to the left of the
/// given coordinate chains.
///
/// Every chain must begin and end on the boundary of `rect`. Chains are
/// stitched into closed rings: from the exit point of a chain, the boundary
/// is walked counter-clockwise (interior on the left) to the nearest entry
/// point of another chain, interpolating any rectangle corners passed, until
/// the walk returns to the chain it started from. The signed areas of the
/// stitched rings sum to the left-hand area, which lets several chains
/// crossing one cell compose without double-counting the boundary.
#[must_use]
pub fn left_hand_area(rect: &Rect, coord_lists: &[&[DVec2]]) -> f64 {
    let w = rect.width();
    let h = rect.height();
    let corners = [
        (0.0, rect.upper_left()),
        (w, rect.upper_right()),
        (w + h, rect.lower_right()),
        (2.0 * w + h, rect.lower_left()),
    ];

    let mut chains: Vec<CoordinateChain> = coord_lists
        .iter()
        .map(|coords| {
            debug_assert!(coords.len() >= 2);
            CoordinateChain {
                start: rect.perimeter_distance(coords[0]),
                stop: rect.perimeter_distance(coords[coords.len() - 1]),
                coords,
                visited: false,
            }
        })
        .collect();

    let mut total = 0.0;

    for i in 0..chains.len() {
        if chains[i].visited {
            continue;
        }

        let mut ring: Vec<DVec2> = Vec::new();
        let mut k = i;
        loop {
            chains[k].visited = true;
            ring.extend_from_slice(chains[k].coords);

            let stop = chains[k].stop;
            let mut next = i;
            let mut best = rect.perimeter_distance_ccw(stop, chains[i].start);
            for (j, candidate) in chains.iter().enumerate() {
                if j == i || candidate.visited {
                    continue;
                }
                let d = rect.perimeter_distance_ccw(stop, candidate.start);
                if d < best {
                    best = d;
                    next = j;
                }
            }

            let mut crossed: Vec<(f64, DVec2)> = corners
                .iter()
                .map(|&(measure, corner)| (rect.perimeter_distance_ccw(stop, measure), corner))
                .filter(|&(d, _)| d > 0.0 && d < best)
                .collect();
            crossed.sort_by(|a, b| a.0.total_cmp(&b.0));
            ring.extend(crossed.into_iter().map(|(_, corner)| corner));

            if next == i {
                break;
            }
            k = next;
        }

        total += signed_area(&ring);
    }

    total
}
