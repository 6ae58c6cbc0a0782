// 分离模型目录
//
// 模型版本固定，通过配置中的 ID 选择，不同模型只影响 audio-separator 的参数。

use serde::{Deserialize, Serialize};

/// 模型架构类型
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum ModelArchitecture {
    /// Demucs (yaml 配置)
    Demucs,
    /// MDX-Net (ONNX 格式)
    MdxNet,
}

/// 模型信息
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInfo {
    /// 模型唯一标识
    pub id: String,
    /// 显示名称
    pub name: String,
    pub architecture: ModelArchitecture,
    /// 传给 --model_filename 的文件名
    pub filename: String,
    pub description: String,
    /// 输出轨道数 (2=人声+伴奏, 4=人声+鼓+贝斯+其他)
    pub stems: u8,
}

/// 获取所有可用模型列表
pub fn get_available_models() -> Vec<ModelInfo> {
    vec![
        ModelInfo {
            id: "htdemucs_ft".to_string(),
            name: "Demucs v4 Hybrid Transformer (fine-tuned)".to_string(),
            architecture: ModelArchitecture::Demucs,
            filename: "htdemucs_ft.yaml".to_string(),
            description: "质量最高，速度较慢".to_string(),
            stems: 4,
        },
        ModelInfo {
            id: "htdemucs".to_string(),
            name: "Demucs v4 Hybrid Transformer".to_string(),
            architecture: ModelArchitecture::Demucs,
            filename: "htdemucs.yaml".to_string(),
            description: "质量与速度均衡".to_string(),
            stems: 4,
        },
        ModelInfo {
            id: "mdx-inst-hq3".to_string(),
            name: "MDX-Net Inst HQ3".to_string(),
            architecture: ModelArchitecture::MdxNet,
            filename: "UVR-MDX-NET-Inst_HQ_3.onnx".to_string(),
            description: "快速，适合大多数场景".to_string(),
            stems: 2,
        },
    ]
}

/// 根据 ID 获取模型信息
pub fn get_model_by_id(model_id: &str) -> Option<ModelInfo> {
    get_available_models().into_iter().find(|m| m.id == model_id)
}
