use super::*;
use crate::grid::control::{ControlGrid, GridSnapshot};
use crate::mesh::builder::build_mesh;
use image::{Rgb, RgbImage};

fn gradient(w: u32, h: u32) -> RgbImage {
    ImageBuffer::from_fn(w, h, |x, y| {
        Rgb([(x * 7 + 1) as u8, (y * 5 + 1) as u8, ((x + y) * 3 + 1) as u8])
    })
}

fn tri(c: [f64; 6]) -> Triangle {
    Triangle::new(
        Point::new(c[0], c[1]),
        Point::new(c[2], c[3]),
        Point::new(c[4], c[5]),
    )
}

#[test]
fn identity_warp_reproduces_source_inside_footprint() {
    let src = gradient(32, 32);
    let t = tri([2.3, 1.7, 29.1, 4.2, 8.6, 27.9]);
    for filter in [SampleFilter::Bilinear, SampleFilter::Nearest] {
        let mut dst = RgbImage::new(32, 32);
        let written = warp_triangle(&src, &mut dst, &t, &t, filter);
        assert!(written > 100);

        let mut covered = 0u64;
        for (x, y, px) in dst.enumerate_pixels() {
            let centre = Point::new(f64::from(x) + 0.5, f64::from(y) + 0.5);
            if t.covers(centre) {
                covered += 1;
                assert_eq!(px, src.get_pixel(x, y), "({x},{y}) {filter:?}");
            } else {
                assert_eq!(*px, Rgb([0, 0, 0]), "({x},{y}) written outside");
            }
        }
        assert_eq!(covered, written);
    }
}

#[test]
fn integer_translation_shifts_pixels() {
    let src = gradient(32, 32);
    let s = tri([0.0, 0.0, 16.0, 0.0, 0.0, 16.0]);
    let d = tri([8.0, 4.0, 24.0, 4.0, 8.0, 20.0]);
    let mut dst = RgbImage::new(32, 32);
    warp_triangle(&src, &mut dst, &s, &d, SampleFilter::Bilinear);

    for y in 4..20u32 {
        for x in 8..24u32 {
            let centre = Point::new(f64::from(x) + 0.5, f64::from(y) + 0.5);
            if d.covers(centre) {
                assert_eq!(dst.get_pixel(x, y), src.get_pixel(x - 8, y - 4));
            }
        }
    }
}

#[test]
fn identity_mesh_covers_every_pixel_exactly_once() {
    let src = gradient(32, 32);
    let grid = GridSnapshot::even(32, 32, 3).unwrap();
    let mesh = build_mesh(&grid, 1.0, 1.0).unwrap();

    let mut dst = RgbImage::new(32, 32);
    let stats = warp_mesh(&src, &mut dst, &mesh, &mesh, SampleFilter::Bilinear).unwrap();
    assert_eq!(stats.pixels_written, 32 * 32);
    assert_eq!(stats.triangles_warped, mesh.len() as u64);
    assert_eq!(stats.triangles_skipped, 0);
    assert_eq!(dst, src);
}

#[test]
fn scaled_mesh_partitions_a_non_square_image() {
    let src = gradient(45, 27);
    let grid = GridSnapshot::even(600, 600, 5).unwrap();
    let mesh = build_mesh(&grid, 45.0 / 600.0, 27.0 / 600.0).unwrap();
    let mut dst = RgbImage::new(45, 27);
    let stats = warp_mesh(&src, &mut dst, &mesh, &mesh, SampleFilter::Nearest).unwrap();
    assert_eq!(stats.pixels_written, 45 * 27);
}

#[test]
fn collapsed_triangles_leave_prefill_untouched() {
    let src = gradient(32, 32);
    let mut grid = ControlGrid::new(32, 32, 3).unwrap();
    let src_mesh = build_mesh(&grid.snapshot(), 1.0, 1.0).unwrap();

    // Pull three interior points onto one spot so some destination triangles collapse.
    for (r, c) in [(1, 1), (1, 2), (2, 2)] {
        grid.move_point(r, c, Point::new(12.0, 12.0)).unwrap();
    }
    let dst_mesh = build_mesh(&grid.snapshot(), 1.0, 1.0).unwrap();

    let fill = Rgb([9, 9, 9]);
    let mut dst = RgbImage::from_pixel(32, 32, fill);
    let stats = warp_mesh(&src, &mut dst, &src_mesh, &dst_mesh, SampleFilter::Bilinear).unwrap();
    assert!(stats.triangles_skipped >= 1);

    let collapsed = dst_mesh.get(1, 1, 1).unwrap();
    assert!(collapsed.is_degenerate());
    let before = dst.clone();
    let n = warp_triangle(
        &src,
        &mut dst,
        src_mesh.get(1, 1, 1).unwrap(),
        collapsed,
        SampleFilter::Bilinear,
    );
    assert_eq!(n, 0);
    assert_eq!(dst, before);
}

#[test]
fn triangles_outside_the_buffer_write_nothing() {
    let src = gradient(8, 8);
    let mut dst = RgbImage::new(8, 8);
    let s = tri([0.0, 0.0, 8.0, 0.0, 0.0, 8.0]);
    let d = tri([100.0, 100.0, 120.0, 100.0, 100.0, 120.0]);
    assert_eq!(warp_triangle(&src, &mut dst, &s, &d, SampleFilter::Bilinear), 0);
    assert_eq!(dst, RgbImage::new(8, 8));
}

#[test]
fn mismatched_meshes_are_a_contract_violation() {
    let src = gradient(8, 8);
    let mut dst = src.clone();
    let a = build_mesh(&GridSnapshot::even(8, 8, 1).unwrap(), 1.0, 1.0).unwrap();
    let b = build_mesh(&GridSnapshot::even(8, 8, 2).unwrap(), 1.0, 1.0).unwrap();
    assert!(matches!(
        warp_mesh(&src, &mut dst, &a, &b, SampleFilter::Bilinear),
        Err(MorphError::GridContract(_))
    ));
}
