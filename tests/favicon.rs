use aiu_assets::badge::{render_badge, BadgeCenter, BadgeSpec};
use aiu_assets::brand::{self, Palette};
use aiu_assets::text::{FontChain, Typeface};
use aiu_assets::{generate_favicon_96, generate_favicon_set, Options};
use image::{ColorType, Rgba, RgbaImage};
use std::fs::File;
use std::path::Path;
use tempfile::TempDir;

fn test_options(dir: &Path) -> Options {
    Options {
        logo: dir.join("missing_logo.png"),
        fonts: FontChain::builtin_only(),
        downloads: dir.join("Downloads"),
        public: dir.join("public"),
        ..Options::default()
    }
}

/// Creates a solid green logo
fn create_logo(path: &Path, size: u32) {
    let logo = RgbaImage::from_pixel(size, size, Rgba([0, 255, 0, 255]));
    logo.save(path).expect("Failed to save logo");
}

/// Counts near-white pixels in the square of `half` pixels around the centre.
fn white_pixels_near_centre(img: &RgbaImage, half: u32) -> usize {
    let c = img.width() / 2;
    let mut count = 0;
    for y in c - half..c + half {
        for x in c - half..c + half {
            let p = img.get_pixel(x, y);
            if p[0] >= 240 && p[1] >= 240 && p[2] >= 240 && p[3] > 0 {
                count += 1;
            }
        }
    }
    count
}

#[test]
fn favicon_96_is_square_rgba() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let options = test_options(temp_dir.path());

    let path = generate_favicon_96(&options).expect("favicon generation failed");
    assert_eq!(path, options.downloads.join(brand::FAVICON_96_FILE));

    let img = image::open(&path).expect("Failed to load favicon");
    assert_eq!((img.width(), img.height()), (96, 96));
    assert_eq!(img.color(), ColorType::Rgba8);

    // corners are outside the disc
    let rgba = img.to_rgba8();
    assert_eq!(rgba.get_pixel(0, 0)[3], 0);
    assert_eq!(rgba.get_pixel(95, 95)[3], 0);
}

#[test]
fn missing_logo_draws_text_label() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let options = test_options(temp_dir.path());

    let path = generate_favicon_96(&options).expect("favicon generation failed");
    let img = image::open(&path).unwrap().to_rgba8();

    let white = white_pixels_near_centre(&img, 20);
    assert!(white > 20, "expected label strokes near the centre, found {white} white pixels");
}

#[test]
fn logo_replaces_label() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let logo_path = temp_dir.path().join("logo.png");
    create_logo(&logo_path, 100);

    let spec = BadgeSpec::gmail_96();
    let (img, center) = render_badge(&spec, &Palette::default(), &logo_path, &Typeface::Builtin);

    assert_eq!(center, BadgeCenter::Logo);
    let p = img.get_pixel(48, 48);
    assert!(p[1] > 250 && p[0] < 5 && p[2] < 5, "centre should be logo green, got {p:?}");
    assert_eq!(white_pixels_near_centre(&img, 20), 0);
}

#[test]
fn unreadable_logo_falls_back_to_label() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let logo_path = temp_dir.path().join("logo.png");
    std::fs::write(&logo_path, b"definitely not a png").unwrap();

    let spec = BadgeSpec::favicon(64);
    let (img, center) = render_badge(&spec, &Palette::default(), &logo_path, &Typeface::Builtin);

    assert_eq!(center, BadgeCenter::Label);
    assert_eq!((img.width(), img.height()), (64, 64));
    assert!(white_pixels_near_centre(&img, 12) > 0);
}

#[test]
fn small_favicon_has_no_shadow() {
    let spec = BadgeSpec::favicon(16);
    let missing = Path::new("does/not/exist.png");
    let (img, _) = render_badge(&spec, &Palette::default(), missing, &Typeface::Builtin);

    // a shadow would leave pixels much darker than the gradient
    for p in img.pixels().filter(|p| p[3] == 255) {
        assert!(
            p[0] >= 150,
            "unexpected dark pixel {p:?} in 16px favicon"
        );
    }
}

#[test]
fn favicon_set_writes_pngs_and_ico() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let options = test_options(temp_dir.path());

    let ico_path = generate_favicon_set(&options).expect("favicon set generation failed");
    assert_eq!(ico_path, options.downloads.join(brand::FAVICON_ICO_FILE));

    for size in brand::FAVICON_SIZES {
        let png_path = options.downloads.join(brand::favicon_png_file(size));
        let img = image::open(&png_path)
            .unwrap_or_else(|e| panic!("Failed to load {}: {e}", png_path.display()));
        assert_eq!((img.width(), img.height()), (size, size));
        assert_eq!(img.color(), ColorType::Rgba8);
    }

    let icon_dir = ico::IconDir::read(File::open(&ico_path).unwrap()).expect("Invalid ICO file");
    let mut sizes: Vec<u32> = icon_dir.entries().iter().map(|e| e.width()).collect();
    sizes.sort_unstable();
    assert_eq!(sizes, brand::FAVICON_SIZES.to_vec());
    for entry in icon_dir.entries() {
        assert_eq!(entry.width(), entry.height());
    }
}

#[test]
fn output_is_deterministic() {
    let first = TempDir::new().unwrap();
    let second = TempDir::new().unwrap();

    let a = generate_favicon_96(&test_options(first.path())).unwrap();
    let b = generate_favicon_96(&test_options(second.path())).unwrap();
    assert_eq!(std::fs::read(a).unwrap(), std::fs::read(b).unwrap());

    let a = generate_favicon_set(&test_options(first.path())).unwrap();
    let b = generate_favicon_set(&test_options(second.path())).unwrap();
    assert_eq!(std::fs::read(a).unwrap(), std::fs::read(b).unwrap());
}

#[test]
fn unwritable_output_is_an_error() {
    let temp_dir = TempDir::new().unwrap();
    let blocked = temp_dir.path().join("blocked");
    std::fs::write(&blocked, b"").unwrap();

    let options = Options {
        downloads: blocked,
        ..test_options(temp_dir.path())
    };
    assert!(generate_favicon_96(&options).is_err());
}
