//! Fixture builders shared by the integration tests.
//!
//! Comic archives are generated on the fly with `zip` and `image` so the
//! tests carry no binary fixtures.

#![allow(dead_code)]

use std::fs::File;
use std::io::{Cursor, Read, Write};
use std::path::Path;

use image::{DynamicImage, ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
use zip::ZipArchive;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

/// One entry of a generated comic archive.
pub enum Entry<'a> {
    Png(&'a str, u32, u32),
    TransparentPng(&'a str, u32, u32),
    Jpeg(&'a str, u32, u32),
    Raw(&'a str, &'a [u8]),
    Dir(&'a str),
}

pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x * 7 % 256) as u8, (y * 13 % 256) as u8, 128])
    });
    encode(DynamicImage::ImageRgb8(img), ImageFormat::Png)
}

pub fn transparent_png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = RgbaImage::from_pixel(width, height, Rgba([0, 0, 255, 64]));
    encode(DynamicImage::ImageRgba8(img), ImageFormat::Png)
}

pub fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_pixel(width, height, Rgb([200, 40, 40]));
    encode(DynamicImage::ImageRgb8(img), ImageFormat::Jpeg)
}

fn encode(img: DynamicImage, format: ImageFormat) -> Vec<u8> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), format)
        .expect("Failed to encode fixture image");
    buf
}

/// Write a CBZ at `path` containing `entries` in the given order.
pub fn write_cbz(path: &Path, entries: &[Entry<'_>]) {
    let file = File::create(path).expect("Failed to create fixture archive");
    let mut zip = ZipWriter::new(file);
    let opts = SimpleFileOptions::default();

    for entry in entries {
        let (name, data) = match entry {
            Entry::Dir(name) => {
                zip.add_directory(*name, opts).unwrap();
                continue;
            }
            Entry::Png(name, w, h) => (*name, png_bytes(*w, *h)),
            Entry::TransparentPng(name, w, h) => (*name, transparent_png_bytes(*w, *h)),
            Entry::Jpeg(name, w, h) => (*name, jpeg_bytes(*w, *h)),
            Entry::Raw(name, bytes) => (*name, bytes.to_vec()),
        };
        zip.start_file(name, opts).unwrap();
        zip.write_all(&data).unwrap();
    }

    zip.finish().expect("Failed to finish fixture archive");
}

/// Entry names of a ZIP file in archive order.
pub fn entry_names(path: &Path) -> Vec<String> {
    let mut archive = ZipArchive::new(File::open(path).unwrap()).unwrap();
    (0..archive.len())
        .map(|i| archive.by_index(i).unwrap().name().to_string())
        .collect()
}

/// Raw bytes of one entry.
pub fn read_entry(path: &Path, name: &str) -> Vec<u8> {
    let mut archive = ZipArchive::new(File::open(path).unwrap()).unwrap();
    let mut entry = archive
        .by_name(name)
        .unwrap_or_else(|_| panic!("entry {name} missing"));
    let mut data = Vec::new();
    entry.read_to_end(&mut data).unwrap();
    data
}
