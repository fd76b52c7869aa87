/*
 * @Description  : 可训练参数的句柄
 *
 * 参数归模型所有，优化器只持有其句柄（克隆句柄不会复制数据），并在`step()`中原地修改参数值。
 * 梯度由外部（自动微分等）在每一步写入，可以在两步之间被清空。
 */

use std::cell::{RefCell, RefMut};
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use crate::errors::OptimizerError;
use crate::tensor::Tensor;

static NEXT_PARAMETER_ID: AtomicU64 = AtomicU64::new(0);

/// 参数的唯一标识，优化器据此索引各参数的状态（如动量）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ParameterId(u64);

#[derive(Debug)]
pub(crate) struct ParameterData {
    pub(crate) value: Tensor,
    pub(crate) grad: Option<Tensor>,
}

/// 可训练参数（PyTorch 中的`nn.Parameter`）
///
/// # 使用示例
/// ```ignore
/// let w = Parameter::new(Tensor::new(&[2.0], &[1]));
/// w.set_grad(Some(&Tensor::new(&[0.5], &[1])))?;
/// optimizer.step(None, None)?;
/// ```
#[derive(Debug, Clone)]
pub struct Parameter {
    id: ParameterId,
    inner: Rc<RefCell<ParameterData>>,
}

impl Parameter {
    /// 以给定初始值创建参数，此时没有梯度
    pub fn new(value: Tensor) -> Self {
        Self {
            id: ParameterId(NEXT_PARAMETER_ID.fetch_add(1, Ordering::Relaxed)),
            inner: Rc::new(RefCell::new(ParameterData { value, grad: None })),
        }
    }

    pub const fn id(&self) -> ParameterId {
        self.id
    }

    pub fn shape(&self) -> Vec<usize> {
        self.inner.borrow().value.shape().to_vec()
    }

    /// 参数中元素的个数
    pub fn size(&self) -> usize {
        self.inner.borrow().value.size()
    }

    /// 获取参数值的快照
    pub fn value(&self) -> Tensor {
        self.inner.borrow().value.clone()
    }

    /// 覆盖参数值，形状必须与原值一致
    pub fn set_value(&self, value: &Tensor) -> Result<(), OptimizerError> {
        let mut data = self.inner.borrow_mut();
        check_shape(data.value.shape(), value.shape())?;
        data.value = value.clone();
        Ok(())
    }

    /// 获取梯度的快照（无梯度时为None）
    pub fn grad(&self) -> Option<Tensor> {
        self.inner.borrow().grad.clone()
    }

    pub fn has_grad(&self) -> bool {
        self.inner.borrow().grad.is_some()
    }

    /// 设置梯度，`None`表示本步该参数没有梯度。梯度形状必须与参数一致
    pub fn set_grad(&self, grad: Option<&Tensor>) -> Result<(), OptimizerError> {
        let mut data = self.inner.borrow_mut();
        if let Some(grad) = grad {
            check_shape(data.value.shape(), grad.shape())?;
        }
        data.grad = grad.cloned();
        Ok(())
    }

    /// 清空梯度（相当于 PyTorch 中`zero_grad(set_to_none=True)`）
    pub fn zero_grad(&self) {
        self.inner.borrow_mut().grad = None;
    }

    /// 供优化器原地更新参数值和梯度
    pub(crate) fn data_mut(&self) -> RefMut<'_, ParameterData> {
        self.inner.borrow_mut()
    }
}

impl PartialEq for Parameter {
    /// 两个句柄指向同一个参数时才相等（与值无关）
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Parameter {}

fn check_shape(expected: &[usize], got: &[usize]) -> Result<(), OptimizerError> {
    if expected == got {
        Ok(())
    } else {
        Err(OptimizerError::ShapeMismatch {
            expected: expected.to_vec(),
            got: got.to_vec(),
        })
    }
}
