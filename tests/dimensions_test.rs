//! Property tests for page sizing.

mod common;

use cbz2epub::{Dimensions, ImageTransformer, convert};
use image::{DynamicImage, GenericImageView, RgbImage};
use proptest::prelude::*;
use tempfile::TempDir;

use common::{Entry, read_entry, write_cbz};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn resample_hits_exact_box(
        src_w in 1u32..80,
        src_h in 1u32..80,
        dst_w in 1i64..120,
        dst_h in 1i64..120,
    ) {
        let source = DynamicImage::ImageRgb8(RgbImage::new(src_w, src_h));
        let dims = Dimensions::new(dst_w, dst_h).unwrap();
        let out = ImageTransformer::new(dims).resample(&source);
        prop_assert_eq!(out.dimensions(), (dst_w as u32, dst_h as u32));
    }

    #[test]
    fn non_positive_dimensions_rejected(w in -1000i64..=0, h in 1i64..1000) {
        prop_assert!(Dimensions::new(w, h).is_err());
        prop_assert!(Dimensions::new(h, w).is_err());
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(8))]

    #[test]
    fn packaged_pages_decode_at_target_size(
        src_w in 1u32..40,
        src_h in 1u32..40,
        dst_w in 1i64..64,
        dst_h in 1i64..64,
    ) {
        let tmp = TempDir::new().unwrap();
        let cbz = tmp.path().join("p.cbz");
        let epub = tmp.path().join("p.epub");
        write_cbz(&cbz, &[Entry::Png("page.png", src_w, src_h)]);

        convert(&cbz, &epub, dst_w, dst_h).unwrap();

        let img = image::load_from_memory(&read_entry(&epub, "OPS/images/page.jpg")).unwrap();
        prop_assert_eq!(img.dimensions(), (dst_w as u32, dst_h as u32));
    }
}
