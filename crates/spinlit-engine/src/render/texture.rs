use std::fmt;
use std::path::{Path, PathBuf};

use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageBuffer, Pixel};

/// Texel layout of a decoded image, chosen from its channel count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TexelFormat {
    R8,
    Rgb8,
    Rgba8,
}

impl TexelFormat {
    pub fn from_channel_count(channels: u8) -> Result<Self, TextureError> {
        match channels {
            1 => Ok(Self::R8),
            3 => Ok(Self::Rgb8),
            4 => Ok(Self::Rgba8),
            n => Err(TextureError::UnsupportedChannels(n)),
        }
    }

    /// GPU format. There is no three-channel 8-bit format, so RGB uploads
    /// as RGBA with opaque alpha.
    pub fn wgpu_format(self) -> wgpu::TextureFormat {
        match self {
            Self::R8 => wgpu::TextureFormat::R8Unorm,
            Self::Rgb8 | Self::Rgba8 => wgpu::TextureFormat::Rgba8Unorm,
        }
    }

    /// Bytes per texel as uploaded.
    pub fn upload_bytes_per_pixel(self) -> u32 {
        match self {
            Self::R8 => 1,
            Self::Rgb8 | Self::Rgba8 => 4,
        }
    }
}

#[derive(Debug)]
pub enum TextureError {
    Decode { path: PathBuf, source: image::ImageError },
    UnsupportedChannels(u8),
    TooLarge { width: u32, height: u32, max: u32 },
}

impl fmt::Display for TextureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Decode { path, source } => {
                write!(f, "failed to load texture '{}': {}", path.display(), source)
            }
            Self::UnsupportedChannels(n) => {
                write!(f, "unsupported texture channel count: {n}")
            }
            Self::TooLarge { width, height, max } => {
                write!(f, "texture is {width}x{height}, the device allows at most {max} per side")
            }
        }
    }
}

impl std::error::Error for TextureError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Decode { source, .. } => Some(source),
            Self::UnsupportedChannels(_) | Self::TooLarge { .. } => None,
        }
    }
}

/// Decoded pixels plus a full mip chain, ready for upload.
#[derive(Debug, Clone)]
pub struct TextureImage {
    pub width: u32,
    pub height: u32,
    pub format: TexelFormat,
    /// Level 0 first; each level packed tightly in the upload layout.
    pub levels: Vec<Vec<u8>>,
}

impl TextureImage {
    pub fn decode(path: impl AsRef<Path>) -> Result<Self, TextureError> {
        let path = path.as_ref();
        let img = image::open(path).map_err(|source| TextureError::Decode {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_dynamic(img)
    }

    pub fn from_dynamic(img: DynamicImage) -> Result<Self, TextureError> {
        let format = TexelFormat::from_channel_count(img.color().channel_count())?;
        let (width, height) = (img.width(), img.height());

        let levels = match format {
            TexelFormat::R8 => mip_chain(img.into_luma8()),
            TexelFormat::Rgb8 | TexelFormat::Rgba8 => mip_chain(img.into_rgba8()),
        };

        Ok(Self { width, height, format, levels })
    }

    /// A single opaque texel, used when a texture file cannot be loaded.
    pub fn solid(rgba: [u8; 4]) -> Self {
        Self {
            width: 1,
            height: 1,
            format: TexelFormat::Rgba8,
            levels: vec![rgba.to_vec()],
        }
    }

    /// Fails when either side exceeds `max_dimension`.
    pub fn check_fits(&self, max_dimension: u32) -> Result<(), TextureError> {
        if self.width > max_dimension || self.height > max_dimension {
            return Err(TextureError::TooLarge {
                width: self.width,
                height: self.height,
                max: max_dimension,
            });
        }
        Ok(())
    }

    pub fn mip_level_count(&self) -> u32 {
        self.levels.len() as u32
    }

    /// Size of mip `level`.
    pub fn level_size(&self, level: u32) -> (u32, u32) {
        ((self.width >> level).max(1), (self.height >> level).max(1))
    }
}

/// Number of levels in a full chain down to 1x1.
pub fn full_mip_count(width: u32, height: u32) -> u32 {
    32 - width.max(height).max(1).leading_zeros()
}

fn mip_chain<P>(base: ImageBuffer<P, Vec<u8>>) -> Vec<Vec<u8>>
where
    P: Pixel<Subpixel = u8> + 'static,
{
    let (w, h) = base.dimensions();
    let count = full_mip_count(w, h);

    let mut levels = Vec::with_capacity(count as usize);
    for level in 1..count {
        let lw = (w >> level).max(1);
        let lh = (h >> level).max(1);
        levels.push(imageops::resize(&base, lw, lh, FilterType::Triangle).into_raw());
    }
    levels.insert(0, base.into_raw());
    levels
}

/// A sampled 2D texture with all mip levels uploaded.
pub struct Texture {
    _texture: wgpu::Texture,
    view: wgpu::TextureView,
}

impl Texture {
    pub fn upload(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        image: &TextureImage,
        label: &str,
    ) -> Result<Self, TextureError> {
        image.check_fits(device.limits().max_texture_dimension_2d)?;

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width: image.width,
                height: image.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: image.mip_level_count(),
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: image.format.wgpu_format(),
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        let bpp = image.format.upload_bytes_per_pixel();
        for (level, pixels) in image.levels.iter().enumerate() {
            let level = level as u32;
            let (w, h) = image.level_size(level);
            queue.write_texture(
                wgpu::TexelCopyTextureInfo {
                    texture: &texture,
                    mip_level: level,
                    origin: wgpu::Origin3d::ZERO,
                    aspect: wgpu::TextureAspect::All,
                },
                pixels,
                wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(w * bpp),
                    rows_per_image: Some(h),
                },
                wgpu::Extent3d { width: w, height: h, depth_or_array_layers: 1 },
            );
        }

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Ok(Self { _texture: texture, view })
    }

    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }
}

/// Repeating, trilinear sampler shared by material textures.
pub fn create_sampler(device: &wgpu::Device) -> wgpu::Sampler {
    device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some("material sampler"),
        address_mode_u: wgpu::AddressMode::Repeat,
        address_mode_v: wgpu::AddressMode::Repeat,
        address_mode_w: wgpu::AddressMode::Repeat,
        mag_filter: wgpu::FilterMode::Linear,
        min_filter: wgpu::FilterMode::Linear,
        mipmap_filter: wgpu::MipmapFilterMode::Linear,
        ..Default::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_counts() {
        assert_eq!(TexelFormat::from_channel_count(1).unwrap(), TexelFormat::R8);
        assert_eq!(TexelFormat::from_channel_count(3).unwrap(), TexelFormat::Rgb8);
        assert_eq!(TexelFormat::from_channel_count(4).unwrap(), TexelFormat::Rgba8);
        assert!(matches!(
            TexelFormat::from_channel_count(2),
            Err(TextureError::UnsupportedChannels(2))
        ));
    }

    #[test]
    fn mip_counts() {
        assert_eq!(full_mip_count(1, 1), 1);
        assert_eq!(full_mip_count(4, 2), 3);
        assert_eq!(full_mip_count(512, 512), 10);
        assert_eq!(full_mip_count(5, 3), 3);
    }

    #[test]
    fn rgb_is_expanded_with_full_chain() {
        let img = DynamicImage::ImageRgb8(image::RgbImage::from_pixel(4, 2, image::Rgb([10, 20, 30])));
        let tex = TextureImage::from_dynamic(img).unwrap();

        assert_eq!(tex.format, TexelFormat::Rgb8);
        assert_eq!(tex.mip_level_count(), 3);
        let lens: Vec<usize> = tex.levels.iter().map(Vec::len).collect();
        assert_eq!(lens, vec![4 * 2 * 4, 2 * 4, 4]);
        assert_eq!(&tex.levels[0][..4], &[10, 20, 30, 255]);
        assert_eq!(tex.level_size(2), (1, 1));
    }

    #[test]
    fn single_channel_stays_single_channel() {
        let img = DynamicImage::ImageLuma8(image::GrayImage::new(8, 8));
        let tex = TextureImage::from_dynamic(img).unwrap();
        assert_eq!(tex.format.wgpu_format(), wgpu::TextureFormat::R8Unorm);
        assert_eq!(tex.levels[0].len(), 64);
        assert_eq!(tex.levels.last().map(Vec::len), Some(1));
    }

    #[test]
    fn two_channel_images_are_rejected() {
        let img = DynamicImage::ImageLumaA8(image::GrayAlphaImage::new(2, 2));
        assert!(matches!(
            TextureImage::from_dynamic(img),
            Err(TextureError::UnsupportedChannels(2))
        ));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = TextureImage::decode("does/not/exist.png").unwrap_err();
        assert!(matches!(err, TextureError::Decode { .. }));
        assert!(err.to_string().contains("does/not/exist.png"));
    }

    #[test]
    fn decodes_png_from_disk() {
        let path = std::env::temp_dir().join("spinlit-texture-decode-test.png");
        image::RgbaImage::from_pixel(2, 2, image::Rgba([1, 2, 3, 4]))
            .save(&path)
            .unwrap();

        let tex = TextureImage::decode(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!((tex.width, tex.height), (2, 2));
        assert_eq!(tex.format, TexelFormat::Rgba8);
        assert_eq!(&tex.levels[0][..4], &[1, 2, 3, 4]);
    }

    #[test]
    fn oversized_images_do_not_fit() {
        let img = DynamicImage::ImageLuma8(image::GrayImage::new(9, 2));
        let tex = TextureImage::from_dynamic(img).unwrap();

        assert!(tex.check_fits(9).is_ok());
        let err = tex.check_fits(8).unwrap_err();
        assert!(matches!(err, TextureError::TooLarge { width: 9, height: 2, max: 8 }));
        assert!(err.to_string().contains("9x2"), "{err}");

        let tall = TextureImage::from_dynamic(DynamicImage::ImageLuma8(image::GrayImage::new(2, 9)))
            .unwrap();
        assert!(tall.check_fits(8).is_err());
    }

    #[test]
    fn placeholder_is_one_texel() {
        let tex = TextureImage::solid([255, 255, 255, 255]);
        assert_eq!(tex.mip_level_count(), 1);
        assert_eq!(tex.levels[0], vec![255; 4]);
    }
}
