use crate::indicator::error::IndicatorError;

//trailing arithmetic mean of window w
//index i holds the mean of prices[i-w+1..=i], indices below w-1 are None
pub fn moving_average(prices: &[f64], window: usize) -> Result<Vec<Option<f64>>, IndicatorError> {
    if window == 0 {
        return Err(IndicatorError::InvalidWindow(window));
    }

    let mut out = Vec::with_capacity(prices.len());
    for i in 0..prices.len() {
        if i + 1 < window {
            out.push(None);
        } else {
            out.push(sma(&prices[i + 1 - window..=i]));
        }
    }

    Ok(out)
}

//moving average at the last index, None when not enough prices yet
pub fn latest_moving_average(prices: &[f64], window: usize) -> Option<f64> {
    if window == 0 || prices.len() < window {
        return None;
    }
    sma(&prices[prices.len() - window..])
}

//simple mean of a slice
pub fn sma(prices: &[f64]) -> Option<f64> {
    if prices.is_empty() {
        return None;
    }
    Some(prices.iter().sum::<f64>() / prices.len() as f64)
}
