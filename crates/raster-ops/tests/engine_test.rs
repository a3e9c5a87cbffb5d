//! Engine and scheduler tests through the public API.

use raster_core::{Color, Extrapolation, Kernel, Rect, View};
use raster_ops::{
    filter, morph, rank, windowed_transform, windowed_transform_into, Scheduler, SchedulerConfig,
    WindowSpec,
};

fn noise(width: u32, height: u32, channels: usize) -> View {
    // xorshift, fixed seed
    let mut s = 0x2545_f491u32;
    let data = (0..width as usize * height as usize * channels)
        .map(|_| {
            s ^= s << 13;
            s ^= s >> 17;
            s ^= s << 5;
            (s >> 24) as u8
        })
        .collect();
    View::from_data(width, height, channels, data).unwrap()
}

fn scheduler(workers: usize) -> Scheduler {
    Scheduler::new(SchedulerConfig::with_workers(workers)).unwrap()
}

#[test]
fn test_worker_count_does_not_change_output() {
    let src = noise(37, 23, 3);
    let one = scheduler(1);
    let eight = scheduler(8);
    let kernel = Kernel::gaussian(2, 1.3).unwrap();
    let se = morph::StructuringElement::ellipse(5, 3).unwrap();

    for ext in Extrapolation::ALL {
        let a = filter::convolve(&one, &src, &kernel, ext).unwrap();
        let b = filter::convolve(&eight, &src, &kernel, ext).unwrap();
        assert_eq!(a.to_vec(), b.to_vec(), "convolve {ext}");

        let a = rank::median(&one, &src, 2, ext).unwrap();
        let b = rank::median(&eight, &src, 2, ext).unwrap();
        assert_eq!(a.to_vec(), b.to_vec(), "median {ext}");

        let a = morph::dilate(&one, &src, &se, ext, 2).unwrap();
        let b = morph::dilate(&eight, &src, &se, ext, 2).unwrap();
        assert_eq!(a.to_vec(), b.to_vec(), "dilate {ext}");
    }
}

#[test]
fn test_operator_sees_extrapolated_border() {
    let src = View::from_data(5, 3, 1, (1..=15).collect()).unwrap();
    let spec = WindowSpec::new(3, 3).extrapolation(Extrapolation::Wrap);
    // Top-left aperture sample of output (0, 0) is source (-1, -1).
    let out = windowed_transform(&scheduler(2), &src, &spec, |a, c| a.read_pixel(0, 0, c)).unwrap();
    assert_eq!(out.get(0, 0, 0).unwrap(), 15);
    assert_eq!(out.get(1, 1, 0).unwrap(), 1);
}

#[test]
fn test_transform_of_sub_view() {
    let image = noise(10, 10, 2);
    let region = image.sub_view(Rect::new(3, 2, 4, 5)).unwrap();
    let spec = WindowSpec::new(3, 3);
    let out = windowed_transform(&scheduler(3), &region, &spec, |a, c| a.read_pixel(1, 1, c)).unwrap();
    assert_eq!(out.dimensions(), (4, 5));
    assert_eq!(out.to_vec(), region.to_vec());
}

#[test]
fn test_transform_into_channel_view() {
    let image = noise(6, 6, 3);
    let before = image.to_vec();
    let green = image.channel_view(1, 1).unwrap();
    let spec = WindowSpec::new(1, 1);
    windowed_transform_into(&scheduler(2), &green, &green, &spec, |_, c| {
        c[0] = 7.0;
        Ok(())
    })
    .unwrap();
    let after = image.to_vec();
    for (i, (a, b)) in before.iter().zip(&after).enumerate() {
        if i % 3 == 1 {
            assert_eq!(*b, 7);
        } else {
            assert_eq!(a, b, "sample {i} outside the channel view changed");
        }
    }
}

#[test]
fn test_invalid_spec_rejected_before_operator_runs() {
    let src = noise(4, 4, 1);
    let dest = View::new(4, 4, 1).unwrap();
    let sched = scheduler(2);
    let bad = [
        WindowSpec::new(0, 3),
        WindowSpec::new(3, 3).anchor(0, 3),
        WindowSpec::new(3, 3).iterations(0),
    ];
    for spec in bad {
        let err = windowed_transform_into(&sched, &src, &dest, &spec, |_, _| {
            panic!("operator ran for {spec:?}")
        })
        .unwrap_err();
        assert!(err.is_invalid_argument(), "{err}");
    }
    assert!(dest.to_vec().iter().all(|&s| s == 0));
}

#[test]
fn test_multi_iteration_failure_leaves_no_output() {
    use std::sync::atomic::{AtomicUsize, Ordering};
    let src = noise(8, 8, 1);
    let dest = View::new(8, 8, 1).unwrap();
    let calls = AtomicUsize::new(0);
    let spec = WindowSpec::new(3, 3).iterations(3);
    // Fails partway through the second pass.
    let err = windowed_transform_into(&scheduler(1), &src, &dest, &spec, |a, c| {
        if calls.fetch_add(1, Ordering::Relaxed) == 64 + 10 {
            return Err(raster_core::Error::invalid_argument("stop"));
        }
        a.read_pixel(1, 1, c)
    })
    .unwrap_err();
    assert!(err.is_invalid_argument());
    assert!(dest.to_vec().iter().all(|&s| s == 0));
}

#[test]
fn test_for_each_pixel_deterministic_across_workers() {
    let src = noise(31, 17, 1);
    let mut outputs = Vec::new();
    for workers in [1, 2, 5, 8] {
        let dst = View::new(31, 17, 1).unwrap();
        scheduler(workers)
            .for_each_pixel(&dst, |x, y, _| {
                let v = src.get(x, y, 0)? as i32;
                dst.set(x, y, 0, 255 - v)
            })
            .unwrap();
        outputs.push(dst.to_vec());
    }
    assert!(outputs.windows(2).all(|w| w[0] == w[1]));
}

#[test]
fn test_fill_through_for_each_channel() {
    let view = View::new(3, 3, 4).unwrap();
    scheduler(4)
        .for_each_channel(&view, |c| {
            let mut color = Color::zeros(1);
            color[0] = 60.0 * c as f32;
            view.channel_view(c, 1)?.fill(&color)
        })
        .unwrap();
    assert_eq!(view.pixel(2, 2).unwrap().as_slice(), &[0.0, 60.0, 120.0, 180.0]);
}
