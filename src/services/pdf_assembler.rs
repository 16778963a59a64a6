//! PDF 组装服务 - 业务能力层
//!
//! - 截图 → 单页 PDF（一张图一页，顺序不变）
//! - 多个课时 PDF → 整本课程 PDF（按传入顺序拼接）
//! - 原子写入：先写 `.part` 再重命名，重复运行只会覆盖，不会留下半个文件

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream};
use tokio::fs;
use tracing::debug;

use crate::error::AssemblyError;

/// PDF 页面边长上限（pt）
const MAX_PAGE_POINTS: u32 = 14_400;

/// 把若干张图片组装成一个 PDF，每张图片占一页
///
/// 页面尺寸等于图片像素尺寸（1px = 1pt），超过 PDF 上限时等比缩小。
pub fn images_to_pdf(images: &[Vec<u8>]) -> Result<Vec<u8>, AssemblyError> {
    if images.is_empty() {
        return Err(AssemblyError::EmptyInput);
    }

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let mut kids: Vec<Object> = Vec::with_capacity(images.len());

    for (i, bytes) in images.iter().enumerate() {
        let index = i + 1;
        let img = image::load_from_memory(bytes).map_err(|e| AssemblyError::UnreadableImage {
            index,
            reason: e.to_string(),
        })?;
        let (width, height) = (img.width(), img.height());
        if width == 0 || height == 0 {
            return Err(AssemblyError::UnreadableImage {
                index,
                reason: format!("图片尺寸为 {}x{}", width, height),
            });
        }

        let mut image_stream = Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => width as i64,
                "Height" => height as i64,
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => 8_i64,
            },
            img.to_rgb8().into_raw(),
        );
        // 压缩失败时保留未压缩数据
        let _ = image_stream.compress();
        let image_id = doc.add_object(image_stream);

        let (page_w, page_h) = page_size(width, height);
        let content = Content {
            operations: vec![
                Operation::new("q", vec![]),
                Operation::new(
                    "cm",
                    vec![
                        Object::Integer(page_w),
                        Object::Integer(0),
                        Object::Integer(0),
                        Object::Integer(page_h),
                        Object::Integer(0),
                        Object::Integer(0),
                    ],
                ),
                Operation::new("Do", vec![Object::Name(b"Im0".to_vec())]),
                Operation::new("Q", vec![]),
            ],
        };
        let encoded = content
            .encode()
            .map_err(|e| AssemblyError::Encode(e.to_string()))?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));

        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(page_w),
                Object::Integer(page_h),
            ],
            "Contents" => content_id,
            "Resources" => dictionary! {
                "XObject" => dictionary! {
                    "Im0" => image_id,
                },
            },
        });
        kids.push(page_id.into());
        debug!("第 {} 张图片已加入 PDF ({}x{})", index, width, height);
    }

    finish_document(&mut doc, pages_id, kids)?;
    to_bytes(&mut doc)
}

/// 按给定顺序合并多个 PDF 文件
///
/// 调用方负责按课时序号排序。
pub fn merge_pdfs(paths: &[PathBuf]) -> Result<Vec<u8>, AssemblyError> {
    if paths.is_empty() {
        return Err(AssemblyError::EmptyInput);
    }

    let mut max_id = 1;
    let mut page_ids: Vec<ObjectId> = Vec::new();
    let mut objects: BTreeMap<ObjectId, Object> = BTreeMap::new();

    for path in paths {
        let mut doc = Document::load(path).map_err(|e| AssemblyError::UnreadablePdf {
            path: path.clone(),
            reason: e.to_string(),
        })?;
        doc.renumber_objects_with(max_id);
        max_id = doc.max_id + 1;

        page_ids.extend(doc.get_pages().into_values());
        // 旧的目录节点丢弃，页面统一挂到新的 Pages 下
        objects.extend(
            doc.objects
                .into_iter()
                .filter(|(_, object)| !matches!(dict_type(object), Some(b"Catalog") | Some(b"Pages"))),
        );
    }

    if page_ids.is_empty() {
        return Err(AssemblyError::EmptyInput);
    }

    let mut merged = Document::with_version("1.5");
    merged.objects = objects;
    merged.max_id = max_id;
    let pages_id = merged.new_object_id();

    for page_id in &page_ids {
        if let Some(Object::Dictionary(dict)) = merged.objects.get_mut(page_id) {
            dict.set("Parent", pages_id);
        }
    }

    let kids = page_ids.into_iter().map(Object::from).collect();
    finish_document(&mut merged, pages_id, kids)?;
    to_bytes(&mut merged)
}

/// 原子写入 PDF：先写同目录下的 `.part` 文件，再重命名覆盖
pub async fn write_pdf_atomic(path: &Path, bytes: &[u8]) -> Result<(), AssemblyError> {
    let write_err = |source: std::io::Error| AssemblyError::Write {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await.map_err(write_err)?;
    }

    let part = part_path(path);
    if let Err(e) = fs::write(&part, bytes).await {
        let _ = fs::remove_file(&part).await;
        return Err(write_err(e));
    }
    if let Err(e) = fs::rename(&part, path).await {
        let _ = fs::remove_file(&part).await;
        return Err(write_err(e));
    }
    Ok(())
}

fn part_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".part");
    path.with_file_name(name)
}

fn page_size(width: u32, height: u32) -> (i64, i64) {
    let longest = width.max(height);
    if longest <= MAX_PAGE_POINTS {
        return (width as i64, height as i64);
    }
    let scale = |side: u32| ((side as u64 * MAX_PAGE_POINTS as u64) / longest as u64).max(1) as i64;
    (scale(width), scale(height))
}

fn dict_type(object: &Object) -> Option<&[u8]> {
    object.as_dict().ok()?.get(b"Type").ok()?.as_name().ok()
}

fn finish_document(
    doc: &mut Document,
    pages_id: ObjectId,
    kids: Vec<Object>,
) -> Result<(), AssemblyError> {
    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    Ok(())
}

fn to_bytes(doc: &mut Document) -> Result<Vec<u8>, AssemblyError> {
    let mut out = Vec::new();
    doc.save_to(&mut out)
        .map_err(|e| AssemblyError::Encode(e.to_string()))?;
    Ok(out)
}
